use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::quotes::QuotesQuery;
use crate::forms::quotes::{QuoteForm, QuoteStatusForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_found, redirect, redirect_with_error, render_template};
use crate::services::settings::current_settings;
use crate::services::{ServiceError, quotes as quotes_service};

#[get("/quotes")]
pub async fn quotes(
    query: web::Query<QuotesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match quotes_service::list_quotes(repo.get_ref(), &user, query.into_inner()) {
        Ok(data) => data,
        Err(err) => return redirect_with_error(err, "/", "list quotes"),
    };
    let settings = match current_settings(repo.get_ref()) {
        Ok(settings) => settings,
        Err(err) => return redirect_with_error(err, "/", "load settings"),
    };

    let mut context = base_context(&flash_messages, &user, "quotes");
    context.insert("quotes", &data.quotes);
    context.insert("search_query", &data.search_query);
    context.insert("status", &data.status);
    context.insert("statuses", &data.statuses);
    context.insert("currency", &settings.currency);

    render_template(&tera, "quotes/index.html", &context)
}

#[get("/quotes/new")]
pub async fn new_quote(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match quotes_service::load_new_quote(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "quotes");
            context.insert("products", &data.products);
            context.insert("settings", &data.settings);

            render_template(&tera, "quotes/new.html", &context)
        }
        Err(err) => redirect_with_error(err, "/quotes", "load the quote form"),
    }
}

/// The item rows repeat their field names, so the body is decoded by hand.
#[post("/quotes")]
pub async fn create_quote(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form = match QuoteForm::from_bytes(body.as_ref()) {
        Ok(form) => form,
        Err(err) => return redirect_with_error(err.into(), "/quotes/new", "read the quote form"),
    };

    match quotes_service::create_quote(repo.get_ref(), &user, form) {
        Ok(quote) => {
            FlashMessage::success(format!("Cotización {} creada.", quote.number)).send();
            redirect(&format!("/quotes/{}", quote.id))
        }
        Err(err) => redirect_with_error(err, "/quotes/new", "create a quote"),
    }
}

#[get("/quotes/{quote_id}")]
pub async fn show_quote(
    quote_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, &user, "quotes");
    match quotes_service::show_quote(repo.get_ref(), &user, quote_id.into_inner()) {
        Ok(data) => {
            let mut context = context;
            context.insert("quote", &data.quote.quote);
            context.insert("items", &data.quote.items);
            context.insert("status", &data.status);
            context.insert("transitions", &data.transitions);
            context.insert("can_delete", &data.can_delete);
            context.insert("settings", &data.settings);
            context.insert("currency", &data.settings.currency);

            render_template(&tera, "quotes/show.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera, &context),
        Err(err) => redirect_with_error(err, "/quotes", "load a quote"),
    }
}

#[post("/quotes/{quote_id}/status")]
pub async fn change_status(
    quote_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<QuoteStatusForm>,
) -> impl Responder {
    let quote_id = quote_id.into_inner();
    let location = format!("/quotes/{quote_id}");
    match quotes_service::change_status(repo.get_ref(), &user, quote_id, form) {
        Ok(quote) => {
            FlashMessage::success(format!(
                "Cotización {} marcada como {}.",
                quote.number,
                quote.status.label().to_lowercase()
            ))
            .send();
            redirect(&location)
        }
        Err(err) => redirect_with_error(err, &location, "change a quote status"),
    }
}

#[post("/quotes/{quote_id}/delete")]
pub async fn delete_quote(
    quote_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let quote_id = quote_id.into_inner();
    match quotes_service::delete_quote(repo.get_ref(), &user, quote_id) {
        Ok(()) => {
            FlashMessage::success("Cotización eliminada.").send();
            redirect("/quotes")
        }
        Err(err) => redirect_with_error(err, &format!("/quotes/{quote_id}"), "delete a quote"),
    }
}

#[get("/quotes/{quote_id}/pdf")]
pub async fn quote_pdf(
    quote_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match quotes_service::quote_pdf(repo.get_ref(), &user, quote_id.into_inner()) {
        Ok(pdf) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(pdf.file_name)],
            })
            .body(pdf.bytes),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => redirect_with_error(err, "/quotes", "render a quote PDF"),
    }
}
