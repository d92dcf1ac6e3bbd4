use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::users::{AddUserForm, ResetPasswordForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, redirect_with_error, render_template};
use crate::services::users as users_service;

#[get("/users")]
pub async fn users(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match users_service::list_users(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "users");
            context.insert("users", &data.users);
            context.insert("current_user_id", &data.current_user_id);

            render_template(&tera, "users/index.html", &context)
        }
        Err(err) => redirect_with_error(err, "/", "list users"),
    }
}

#[post("/users")]
pub async fn add_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddUserForm>,
) -> impl Responder {
    match users_service::add_user(repo.get_ref(), &user, form) {
        Ok(created) => {
            FlashMessage::success(format!("Usuario {} creado.", created.email)).send();
            redirect("/users")
        }
        Err(err) => redirect_with_error(err, "/users", "add a user"),
    }
}

async fn set_active(
    user_id: i32,
    is_active: bool,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match users_service::set_user_active(repo.get_ref(), &user, user_id, is_active) {
        Ok(updated) => {
            let message = if is_active {
                format!("Usuario {} activado.", updated.email)
            } else {
                format!("Usuario {} desactivado.", updated.email)
            };
            FlashMessage::success(message).send();
            redirect("/users")
        }
        Err(err) => redirect_with_error(err, "/users", "change a user status"),
    }
}

#[post("/users/{user_id}/activate")]
pub async fn activate_user(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    set_active(user_id.into_inner(), true, user, repo).await
}

#[post("/users/{user_id}/deactivate")]
pub async fn deactivate_user(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    set_active(user_id.into_inner(), false, user, repo).await
}

#[post("/users/{user_id}/password")]
pub async fn reset_password(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ResetPasswordForm>,
) -> impl Responder {
    match users_service::reset_password(repo.get_ref(), &user, user_id.into_inner(), form) {
        Ok(()) => {
            FlashMessage::success("Contraseña actualizada.").send();
            redirect("/users")
        }
        Err(err) => redirect_with_error(err, "/users", "reset a password"),
    }
}
