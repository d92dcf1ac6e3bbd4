//! Creates the first admin account, or resets the password of an existing one.
//!
//! Reads `ADMIN_EMAIL`, `ADMIN_PASSWORD` and optionally `ADMIN_NAME`.

use std::env;

use dotenvy::dotenv;

use cotizador::db::establish_connection_pool;
use cotizador::models::config::ServerConfig;
use cotizador::repository::DieselRepository;
use cotizador::services::users::ensure_admin_user;

fn required_var(name: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            log::error!("{name} must be set");
            std::process::exit(1);
        }
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let email = required_var("ADMIN_EMAIL");
    let password = required_var("ADMIN_PASSWORD");
    let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrador".into());

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    match ensure_admin_user(&repo, &email, &name, &password) {
        Ok(user) => log::info!("Admin user {} is ready", user.email),
        Err(err) => {
            log::error!("Failed to create admin user: {err}");
            std::process::exit(1);
        }
    }
}
