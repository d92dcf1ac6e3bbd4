//! Catalog, quotations and back-office web application.

#[cfg(feature = "server")]
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod pdf;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod session;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: crate::models::config::ServerConfig) -> std::io::Result<()> {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_identity::IdentityMiddleware;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware as actix_middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};

    use crate::db::establish_connection_pool;
    use crate::middleware::RedirectUnauthorized;
    use crate::repository::DieselRepository;
    use crate::routes::api::api_v1_products;
    use crate::routes::auth::{logout, signin, signin_page};
    use crate::routes::categories::{categories, create_category, delete_category, update_category};
    use crate::routes::companies::{
        companies, delete_company, delete_contact, save_company, save_contact, show_company,
        show_contact, update_contact,
    };
    use crate::routes::import::{import_contacts, import_page, import_products};
    use crate::routes::load_templates;
    use crate::routes::main::dashboard;
    use crate::routes::products::{
        create_product, delete_product, edit_product, new_product, products, update_product,
    };
    use crate::routes::quotes::{
        change_status, create_quote, delete_quote, new_quote, quote_pdf, quotes, show_quote,
    };
    use crate::routes::settings::{about_editor, save_about, save_settings, settings};
    use crate::routes::storefront::{about, catalog, product};
    use crate::routes::users::{activate_user, add_user, deactivate_user, reset_password, users};

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes()).map_err(|e| {
        std::io::Error::other(format!("Secret must be at least 64 bytes long: {e}"))
    })?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = load_templates(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(server_config.domain.clone()))
                    .build(),
            )
            .wrap(actix_middleware::Compress::default())
            .wrap(actix_middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(web::scope("/api").service(api_v1_products))
            .service(signin_page)
            .service(signin)
            .service(logout)
            .service(catalog)
            .service(product)
            .service(about)
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(dashboard)
                    .service(products)
                    .service(new_product)
                    .service(create_product)
                    .service(edit_product)
                    .service(update_product)
                    .service(delete_product)
                    .service(categories)
                    .service(create_category)
                    .service(update_category)
                    .service(delete_category)
                    .service(quotes)
                    .service(new_quote)
                    .service(create_quote)
                    .service(show_quote)
                    .service(change_status)
                    .service(delete_quote)
                    .service(quote_pdf)
                    .service(companies)
                    .service(save_company)
                    .service(show_company)
                    .service(delete_company)
                    .service(save_contact)
                    .service(show_contact)
                    .service(update_contact)
                    .service(delete_contact)
                    .service(import_page)
                    .service(import_products)
                    .service(import_contacts)
                    .service(users)
                    .service(add_user)
                    .service(activate_user)
                    .service(deactivate_user)
                    .service(reset_password)
                    .service(settings)
                    .service(save_settings)
                    .service(about_editor)
                    .service(save_about),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
