//! Claims describing the signed-in user of a session.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// Identity carried in the session cookie, encoded as a JWT.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AuthenticatedUser {
    /// Database id of the user, as a string.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Expiration as a unix timestamp.
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Builds the session claims for `user` valid for `ttl_hours`.
    pub fn for_user(user: &User, ttl_hours: i64) -> Self {
        let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp().max(0) as usize;
        Self {
            sub: user.id.get().to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            roles: user.role.granted_roles(),
            exp,
        }
    }

    /// Numeric user id parsed from `sub`.
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}
