use actix_identity::{Identity, IdentityMiddleware};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{
    App, HttpMessage, HttpRequest, HttpResponse, Responder, get,
    http::{StatusCode, header},
    test, web,
};
use chrono::{Duration, Utc};

use cotizador::domain::auth::AuthenticatedUser;
use cotizador::middleware::{RedirectUnauthorized, SIGNIN_PATH};
use cotizador::models::config::ServerConfig;
use cotizador::session::encode_token;

const SECRET: &str = "test-secret-test-secret-test-secret-test-secret-test-secret-0123";

fn config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 8080,
        database_url: ":memory:".to_string(),
        templates_dir: "templates/**/*".to_string(),
        secret: SECRET.to_string(),
        session_ttl_hours: 12,
    }
}

fn seller_claims(expires_in: Duration) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "2".to_string(),
        email: "vendedor@example.com".to_string(),
        name: "Vendedor".to_string(),
        roles: vec!["seller".to_string()],
        exp: (Utc::now() + expires_in).timestamp() as usize,
    }
}

/// Stores a session token in the identity: `valid`, `expired` or `forged`
/// (signed with another secret).
#[get("/test-login/{kind}")]
async fn test_login(req: HttpRequest, kind: web::Path<String>) -> impl Responder {
    let token = match kind.as_str() {
        "valid" => encode_token(&seller_claims(Duration::hours(1)), SECRET),
        "expired" => encode_token(&seller_claims(Duration::hours(-2)), SECRET),
        _ => encode_token(&seller_claims(Duration::hours(1)), "not-the-server-secret"),
    };
    match token.map(|token| Identity::login(&req.extensions(), token)) {
        Ok(Ok(_)) => HttpResponse::Ok().finish(),
        _ => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/quotes")]
async fn quotes(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(user.email)
}

#[get("/users")]
async fn users_for_admins_only() -> impl Responder {
    HttpResponse::Forbidden().finish()
}

macro_rules! back_office_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .wrap(IdentityMiddleware::default())
                .wrap(SessionMiddleware::new(
                    CookieSessionStore::default(),
                    Key::from(SECRET.as_bytes()),
                ))
                .service(test_login)
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(quotes)
                        .service(users_for_admins_only),
                ),
        )
        .await
    };
}

macro_rules! session_cookie {
    ($app:expr, $kind:expr) => {{
        let req = test::TestRequest::get()
            .uri(&format!("/test-login/{}", $kind))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie: Cookie<'static> = resp
            .response()
            .cookies()
            .next()
            .expect("session cookie")
            .into_owned();
        cookie
    }};
}

fn assert_redirects_to_signin<B>(resp: &actix_web::dev::ServiceResponse<B>) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), SIGNIN_PATH);
}

#[actix_web::test]
async fn anonymous_back_office_request_goes_to_signin() {
    let app = back_office_app!();

    let req = test::TestRequest::get().uri("/quotes").to_request();
    let resp = test::call_service(&app, req).await;

    assert_redirects_to_signin(&resp);
}

#[actix_web::test]
async fn signed_in_seller_reaches_the_handler() {
    let app = back_office_app!();
    let cookie = session_cookie!(app, "valid");

    let req = test::TestRequest::get()
        .uri("/quotes")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"vendedor@example.com");
}

#[actix_web::test]
async fn forged_token_goes_to_signin() {
    let app = back_office_app!();
    let cookie = session_cookie!(app, "forged");

    let req = test::TestRequest::get()
        .uri("/quotes")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_redirects_to_signin(&resp);
}

#[actix_web::test]
async fn expired_token_goes_to_signin() {
    let app = back_office_app!();
    let cookie = session_cookie!(app, "expired");

    let req = test::TestRequest::get()
        .uri("/quotes")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_redirects_to_signin(&resp);
}

#[actix_web::test]
async fn forbidden_and_not_found_pass_through() {
    let app = back_office_app!();

    let req = test::TestRequest::get().uri("/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/no-such-page").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
