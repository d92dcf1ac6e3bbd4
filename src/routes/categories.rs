use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::catalog::CategoryForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, redirect_with_error, render_template};
use crate::services::catalog as catalog_service;

#[get("/categories")]
pub async fn categories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match catalog_service::list_categories(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "categories");
            context.insert("categories", &data.categories);

            render_template(&tera, "categories/index.html", &context)
        }
        Err(err) => redirect_with_error(err, "/", "list categories"),
    }
}

#[post("/categories")]
pub async fn create_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    match catalog_service::create_category(repo.get_ref(), &user, form) {
        Ok(category) => {
            FlashMessage::success(format!("Categoría «{}» creada.", category.name)).send();
            redirect("/categories")
        }
        Err(err) => redirect_with_error(err, "/categories", "create a category"),
    }
}

#[post("/categories/{category_id}")]
pub async fn update_category(
    category_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    match catalog_service::update_category(repo.get_ref(), &user, category_id.into_inner(), form)
    {
        Ok(_) => {
            FlashMessage::success("Categoría actualizada.").send();
            redirect("/categories")
        }
        Err(err) => redirect_with_error(err, "/categories", "update a category"),
    }
}

#[post("/categories/{category_id}/delete")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match catalog_service::delete_category(repo.get_ref(), &user, category_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Categoría eliminada.").send();
            redirect("/categories")
        }
        Err(err) => redirect_with_error(err, "/categories", "delete a category"),
    }
}
