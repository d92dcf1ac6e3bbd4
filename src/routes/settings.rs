use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::content::{AboutForm, SettingsForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, redirect_with_error, render_template};
use crate::services::{about as about_service, settings as settings_service};

#[get("/settings")]
pub async fn settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match settings_service::load_settings(repo.get_ref(), &user) {
        Ok(settings) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("settings", &settings);

            render_template(&tera, "settings/index.html", &context)
        }
        Err(err) => redirect_with_error(err, "/", "load settings"),
    }
}

#[post("/settings")]
pub async fn save_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SettingsForm>,
) -> impl Responder {
    match settings_service::save_settings(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Configuración guardada.").send();
            redirect("/settings")
        }
        Err(err) => redirect_with_error(err, "/settings", "save settings"),
    }
}

#[get("/settings/about")]
pub async fn about_editor(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match about_service::load_about_editor(repo.get_ref(), &user) {
        Ok(page) => {
            let mut context = base_context(&flash_messages, &user, "about");
            context.insert("page", &page);

            render_template(&tera, "settings/about.html", &context)
        }
        Err(err) => redirect_with_error(err, "/", "load the about page"),
    }
}

#[post("/settings/about")]
pub async fn save_about(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AboutForm>,
) -> impl Responder {
    match about_service::save_about(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Página «Sobre nosotros» actualizada.").send();
            redirect("/settings/about")
        }
        Err(err) => redirect_with_error(err, "/settings/about", "save the about page"),
    }
}
