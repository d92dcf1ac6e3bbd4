use actix_web_flash_messages::Level;
use cotizador::routes::{alert_level_to_str, load_templates};
use tera::Context;

#[test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[test]
fn test_templates_parse_and_render_signin() {
    let tera = load_templates("templates/**/*").unwrap();

    let mut context = Context::new();
    context.insert("alerts", &vec![("Correo o contraseña incorrectos.", "danger")]);
    context.insert("current_user", &None::<String>);
    context.insert("current_page", "signin");

    let html = tera.render("auth/signin.html", &context).unwrap();
    assert!(html.contains("action=\"/auth/signin\""));
    assert!(html.contains("alert-danger"));
}
