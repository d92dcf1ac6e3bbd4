use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::forms::auth::SignInForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{public_context, redirect, render_template};
use crate::services::{ServiceError, auth as auth_service};
use crate::session::encode_token;

#[get("/auth/signin")]
pub async fn signin_page(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if user.is_some() {
        return redirect("/");
    }
    let context = public_context(&flash_messages, None, "signin");
    render_template(&tera, "auth/signin.html", &context)
}

#[post("/auth/signin")]
pub async fn signin(
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<SignInForm>,
) -> impl Responder {
    let user = match auth_service::sign_in(repo.get_ref(), form, server_config.session_ttl_hours) {
        Ok(user) => user,
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Correo o contraseña incorrectos.").send();
            return redirect("/auth/signin");
        }
        Err(err) => {
            log::error!("Failed to sign in: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let token = match encode_token(&user, &server_config.secret) {
        Ok(token) => token,
        Err(err) => {
            log::error!("Failed to encode session token: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(err) = Identity::login(&request.extensions(), token) {
        log::error!("Failed to store identity: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("User {} signed in", user.email);
    redirect("/")
}

#[post("/auth/logout")]
pub async fn logout(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    redirect("/auth/signin")
}
