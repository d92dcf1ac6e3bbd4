//! Session tokens and extraction of the signed-in user from a request.
//!
//! The identity cookie holds an HS256 JWT with the [`AuthenticatedUser`]
//! claims, signed with the configured server secret.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpRequest, web};
use jsonwebtoken::errors::Error as TokenError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;

pub fn encode_token(user: &AuthenticatedUser, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        user,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies the signature and expiry of a session token.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("Not signed in"))?;
    let token = identity
        .id()
        .map_err(|_| ErrorUnauthorized("Invalid session"))?;
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("Server configuration is missing"))?;

    decode_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("Invalid session")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
