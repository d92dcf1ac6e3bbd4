use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::ADMIN_ROLE;
use crate::dto::import::ImportReport;
use crate::forms::import::ImportUploadForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect_with_error, render_template};
use crate::services::{ServiceResult, ensure_role, import as import_service};

#[get("/import")]
pub async fn import_page(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(err) = ensure_role(&user, ADMIN_ROLE) {
        return redirect_with_error(err, "/", "open the import page");
    }
    let context = base_context(&flash_messages, &user, "import");
    render_template(&tera, "import/index.html", &context)
}

fn render_report(
    result: ServiceResult<ImportReport>,
    kind: &str,
    user: &AuthenticatedUser,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match result {
        Ok(report) => {
            let mut context = base_context(flash_messages, user, "import");
            context.insert("kind", kind);
            context.insert("summary", &report.summary());
            context.insert("report", &report);
            render_template(tera, "import/report.html", &context)
        }
        Err(err) => redirect_with_error(err, "/import", "import a file"),
    }
}

#[post("/import/products")]
pub async fn import_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ImportUploadForm>,
) -> impl Responder {
    let result = import_service::import_products(repo.get_ref(), &user, &form);
    render_report(result, "productos", &user, &flash_messages, &tera)
}

#[post("/import/contacts")]
pub async fn import_contacts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ImportUploadForm>,
) -> impl Responder {
    let result = import_service::import_contacts(repo.get_ref(), &user, &form);
    render_report(result, "contactos", &user, &flash_messages, &tera)
}
