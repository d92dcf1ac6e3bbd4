//! Back-office users and their roles.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Email, TypeConstraintError, UserId, UserName};

/// Role names carried in the session claims.
pub const ADMIN_ROLE: &str = "admin";
pub const SELLER_ROLE: &str = "seller";

/// Role assigned to a user account. Admins implicitly hold the seller role.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Seller,
}

impl UserRole {
    /// Role strings granted to a session for this account role.
    pub fn granted_roles(self) -> Vec<String> {
        match self {
            UserRole::Admin => vec![ADMIN_ROLE.to_string(), SELLER_ROLE.to_string()],
            UserRole::Seller => vec![SELLER_ROLE.to_string()],
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{ADMIN_ROLE}"),
            UserRole::Seller => write!(f, "{SELLER_ROLE}"),
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            ADMIN_ROLE => Ok(UserRole::Admin),
            SELLER_ROLE => Ok(UserRole::Seller),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown role '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: UserName,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: Email,
    pub name: UserName,
    pub password_hash: String,
    pub role: UserRole,
}

impl NewUser {
    #[must_use]
    pub fn new(email: Email, name: UserName, password_hash: String, role: UserRole) -> Self {
        Self {
            email,
            name,
            password_hash,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_also_seller() {
        assert_eq!(
            UserRole::Admin.granted_roles(),
            vec!["admin".to_string(), "seller".to_string()]
        );
        assert_eq!(UserRole::Seller.granted_roles(), vec!["seller".to_string()]);
    }

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!(UserRole::try_from("admin"), Ok(UserRole::Admin));
        assert_eq!(UserRole::try_from(UserRole::Seller.to_string().as_str()), Ok(UserRole::Seller));
        assert!(UserRole::try_from("owner").is_err());
    }
}
