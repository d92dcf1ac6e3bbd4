use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::crm::Contact;
use crate::dto::crm::CompaniesQuery;
use crate::forms::crm::{CompanyForm, ContactForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_found, redirect, redirect_with_error, render_template};
use crate::services::settings::current_settings;
use crate::services::{ServiceError, crm as crm_service};

fn contact_location(contact: &Contact) -> String {
    match contact.company_id {
        Some(company_id) => format!("/companies/{company_id}"),
        None => format!("/contacts/{}", contact.id),
    }
}

#[get("/companies")]
pub async fn companies(
    query: web::Query<CompaniesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match crm_service::list_companies(repo.get_ref(), &user, query.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "companies");
            context.insert("companies", &data.companies);
            context.insert("search_query", &data.search_query);

            render_template(&tera, "companies/index.html", &context)
        }
        Err(err) => redirect_with_error(err, "/", "list companies"),
    }
}

#[post("/companies")]
pub async fn save_company(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CompanyForm>,
) -> impl Responder {
    match crm_service::save_company(repo.get_ref(), &user, form) {
        Ok(company) => {
            FlashMessage::success(format!("Empresa «{}» guardada.", company.name)).send();
            redirect(&format!("/companies/{}", company.id))
        }
        Err(err) => redirect_with_error(err, "/companies", "save a company"),
    }
}

#[get("/companies/{company_id}")]
pub async fn show_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, &user, "companies");
    match crm_service::show_company(repo.get_ref(), &user, company_id.into_inner()) {
        Ok(data) => {
            context.insert("company", &data.company);
            context.insert("contacts", &data.contacts);
            context.insert("quotes", &data.quotes);
            match current_settings(repo.get_ref()) {
                Ok(settings) => context.insert("currency", &settings.currency),
                Err(err) => return redirect_with_error(err, "/companies", "load settings"),
            }

            render_template(&tera, "companies/show.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera, &context),
        Err(err) => redirect_with_error(err, "/companies", "load a company"),
    }
}

#[post("/companies/{company_id}/delete")]
pub async fn delete_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let company_id = company_id.into_inner();
    match crm_service::delete_company(repo.get_ref(), &user, company_id) {
        Ok(()) => {
            FlashMessage::success("Empresa eliminada.").send();
            redirect("/companies")
        }
        Err(err) => redirect_with_error(
            err,
            &format!("/companies/{company_id}"),
            "delete a company",
        ),
    }
}

#[post("/contacts")]
pub async fn save_contact(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ContactForm>,
) -> impl Responder {
    let fallback = match form.company_id.as_deref().map(str::trim) {
        Some(company_id) if !company_id.is_empty() => format!("/companies/{company_id}"),
        _ => "/companies".to_string(),
    };
    match crm_service::save_contact(repo.get_ref(), &user, form) {
        Ok(contact) => {
            FlashMessage::success(format!("Contacto «{}» guardado.", contact.name)).send();
            redirect(&contact_location(&contact))
        }
        Err(err) => redirect_with_error(err, &fallback, "save a contact"),
    }
}

#[get("/contacts/{contact_id}")]
pub async fn show_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, &user, "companies");
    match crm_service::load_contact(repo.get_ref(), &user, contact_id.into_inner()) {
        Ok(data) => {
            context.insert("contact", &data.contact);
            context.insert("company", &data.company);

            render_template(&tera, "contacts/show.html", &context)
        }
        Err(ServiceError::NotFound) => not_found(&tera, &context),
        Err(err) => redirect_with_error(err, "/companies", "load a contact"),
    }
}

#[post("/contacts/{contact_id}")]
pub async fn update_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ContactForm>,
) -> impl Responder {
    let contact_id = contact_id.into_inner();
    match crm_service::update_contact(repo.get_ref(), &user, contact_id, form) {
        Ok(contact) => {
            FlashMessage::success("Contacto actualizado.").send();
            redirect(&contact_location(&contact))
        }
        Err(err) => redirect_with_error(
            err,
            &format!("/contacts/{contact_id}"),
            "update a contact",
        ),
    }
}

#[post("/contacts/{contact_id}/delete")]
pub async fn delete_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let contact_id = contact_id.into_inner();
    match crm_service::delete_contact(repo.get_ref(), &user, contact_id) {
        Ok(()) => {
            FlashMessage::success("Contacto eliminado.").send();
            redirect("/companies")
        }
        Err(err) => redirect_with_error(
            err,
            &format!("/contacts/{contact_id}"),
            "delete a contact",
        ),
    }
}
