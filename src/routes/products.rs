use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::catalog::ProductsQuery;
use crate::forms::catalog::ProductForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, redirect_with_error, render_template};
use crate::services::catalog as catalog_service;
use crate::services::settings::current_settings;

#[get("/products")]
pub async fn products(
    query: web::Query<ProductsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let data = match catalog_service::list_products(repo.get_ref(), &user, query.into_inner()) {
        Ok(data) => data,
        Err(err) => return redirect_with_error(err, "/", "list products"),
    };
    let settings = match current_settings(repo.get_ref()) {
        Ok(settings) => settings,
        Err(err) => return redirect_with_error(err, "/", "load settings"),
    };

    let mut context = base_context(&flash_messages, &user, "products");
    context.insert("products", &data.products);
    context.insert("categories", &data.categories);
    context.insert("search_query", &data.search_query);
    context.insert("category_id", &data.category_id);
    context.insert("currency", &settings.currency);

    render_template(&tera, "products/index.html", &context)
}

#[get("/products/new")]
pub async fn new_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match catalog_service::load_product_form(repo.get_ref(), &user, None) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "products");
            context.insert("product", &data.product);
            context.insert("categories", &data.categories);

            render_template(&tera, "products/form.html", &context)
        }
        Err(err) => redirect_with_error(err, "/products", "load the product form"),
    }
}

#[post("/products")]
pub async fn create_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ProductForm>,
) -> impl Responder {
    match catalog_service::create_product(repo.get_ref(), &user, form) {
        Ok(product) => {
            FlashMessage::success(format!("Producto «{}» creado.", product.name)).send();
            redirect("/products")
        }
        Err(err) => redirect_with_error(err, "/products/new", "create a product"),
    }
}

#[get("/products/{product_id}/edit")]
pub async fn edit_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match catalog_service::load_product_form(repo.get_ref(), &user, Some(product_id.into_inner()))
    {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "products");
            context.insert("product", &data.product);
            context.insert("categories", &data.categories);

            render_template(&tera, "products/form.html", &context)
        }
        Err(err) => redirect_with_error(err, "/products", "load a product"),
    }
}

#[post("/products/{product_id}")]
pub async fn update_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ProductForm>,
) -> impl Responder {
    let product_id = product_id.into_inner();
    match catalog_service::update_product(repo.get_ref(), &user, product_id, form) {
        Ok(_) => {
            FlashMessage::success("Producto actualizado.").send();
            redirect("/products")
        }
        Err(err) => redirect_with_error(
            err,
            &format!("/products/{product_id}/edit"),
            "update a product",
        ),
    }
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match catalog_service::delete_product(repo.get_ref(), &user, product_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Producto eliminado.").send();
            redirect("/products")
        }
        Err(err) => redirect_with_error(err, "/products", "delete a product"),
    }
}
