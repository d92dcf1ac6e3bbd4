use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect_with_error, render_template};
use crate::services::settings::current_settings;
use crate::services::{ServiceError, analytics as analytics_service};

#[get("/")]
pub async fn dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match analytics_service::load_dashboard(repo.get_ref(), &user) {
        Ok(data) => data,
        Err(ServiceError::Unauthorized) => return HttpResponse::Unauthorized().finish(),
        Err(err) => return redirect_with_error(err, "/catalog", "load the dashboard"),
    };
    let settings = match current_settings(repo.get_ref()) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Failed to load settings: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, &user, "dashboard");
    context.insert("counters", &data.counters);
    context.insert("top_products", &data.top_products);
    context.insert("quotes_by_status", &data.quotes_by_status);
    context.insert("latest_quotes", &data.latest_quotes);
    context.insert("currency", &settings.currency);

    render_template(&tera, "main/index.html", &context)
}
