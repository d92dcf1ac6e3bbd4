use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::storefront::CatalogQuery;
use crate::repository::DieselRepository;
use crate::routes::{not_found, public_context, render_template};
use crate::services::settings::current_settings;
use crate::services::{ServiceError, about as about_service, storefront as storefront_service};

/// Public page context with the business settings used by the layout.
fn storefront_context(
    repo: &DieselRepository,
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
) -> Result<Context, HttpResponse> {
    let settings = current_settings(repo).map_err(|err| {
        log::error!("Failed to load settings: {err}");
        HttpResponse::InternalServerError().finish()
    })?;
    let mut context = public_context(flash_messages, user, current_page);
    context.insert("currency", &settings.currency);
    context.insert("settings", &settings);
    Ok(context)
}

#[get("/catalog")]
pub async fn catalog(
    query: web::Query<CatalogQuery>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context =
        match storefront_context(repo.get_ref(), &flash_messages, user.as_ref(), "catalog") {
            Ok(context) => context,
            Err(response) => return response,
        };

    match storefront_service::load_catalog(repo.get_ref(), query.into_inner()) {
        Ok(data) => {
            context.insert("products", &data.products);
            context.insert("categories", &data.categories);
            context.insert("current_category", &data.current_category);
            context.insert("search_query", &data.search_query);

            render_template(&tera, "storefront/catalog.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera, &context),
        Err(err) => {
            log::error!("Failed to load the catalog: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/catalog/{slug}")]
pub async fn product(
    slug: web::Path<String>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context =
        match storefront_context(repo.get_ref(), &flash_messages, user.as_ref(), "catalog") {
            Ok(context) => context,
            Err(response) => return response,
        };

    match storefront_service::load_product(repo.get_ref(), &slug) {
        Ok(data) => {
            context.insert("product", &data.product);
            context.insert("category", &data.category);

            render_template(&tera, "storefront/product.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera, &context),
        Err(err) => {
            log::error!("Failed to load product '{slug}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/about")]
pub async fn about(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context =
        match storefront_context(repo.get_ref(), &flash_messages, user.as_ref(), "about") {
            Ok(context) => context,
            Err(response) => return response,
        };

    match about_service::load_about(repo.get_ref()) {
        Ok(page) => {
            context.insert("page", &page);
            render_template(&tera, "storefront/about.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load the about page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
