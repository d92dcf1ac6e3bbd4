//! HTTP handlers and the helpers they share.

use std::collections::HashMap;
use std::str::FromStr;

use actix_web::http::header;
use actix_web::{HttpResponse, http::StatusCode};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use rust_decimal::Decimal;
use serde_json::Value;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::format_money;
use crate::domain::user::ADMIN_ROLE;
use crate::services::{ServiceError, check_role};

pub mod api;
pub mod auth;
pub mod categories;
pub mod companies;
pub mod import;
pub mod main;
pub mod products;
pub mod quotes;
pub mod settings;
pub mod storefront;
pub mod users;

/// Maps a flash message level to the Bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<(&str, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect()
}

/// Context shared by every back-office page.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("current_user", user);
    context.insert("is_admin", &check_role(ADMIN_ROLE, &user.roles));
    context.insert("current_page", current_page);
    context
}

/// Context for public pages, where the visitor may be signed in or not.
pub fn public_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("current_user", &user);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Renders the 404 page.
pub fn not_found(tera: &Tera, context: &Context) -> HttpResponse {
    let mut response = render_template(tera, "errors/not_found.html", context);
    if response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NOT_FOUND;
    }
    response
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Turns a failed form submission into a flash message and a redirect.
pub fn redirect_with_error(err: ServiceError, location: &str, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("Permisos insuficientes.").send();
            redirect("/")
        }
        ServiceError::NotFound => {
            FlashMessage::error("Registro no encontrado.").send();
            redirect(location)
        }
        ServiceError::Form(message) => {
            FlashMessage::error(message).send();
            redirect(location)
        }
        ServiceError::TypeConstraint(message) => {
            FlashMessage::error(format!("Datos inválidos: {message}")).send();
            redirect(location)
        }
        ServiceError::Conflict(message) => {
            log::warn!("Conflict while trying to {action}: {message}");
            FlashMessage::error("Ya existe un registro con esos datos.").send();
            redirect(location)
        }
        err => {
            log::error!("Failed to {action}: {err}");
            FlashMessage::error("Ocurrió un error inesperado.").send();
            redirect(location)
        }
    }
}

/// Tera filter printing an amount with the quote currency:
/// `{{ quote.totals.total | money(currency="CLP") }}`.
pub fn money_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = match value {
        Value::String(raw) => Decimal::from_str(raw).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
    .ok_or_else(|| tera::Error::msg(format!("money filter expects a number, got {value}")))?;
    let currency = args
        .get("currency")
        .and_then(Value::as_str)
        .unwrap_or("CLP");

    Ok(Value::String(format_money(amount, currency)))
}

/// Loads the templates and registers the custom filters.
pub fn load_templates(pattern: &str) -> tera::Result<Tera> {
    let mut tera = Tera::new(pattern)?;
    tera.register_filter("money", money_filter);
    Ok(tera)
}
