//! Business workflows invoked by the HTTP handlers.
//!
//! Every service is generic over the repository traits it needs so it can be
//! exercised against mocks; role checks happen here rather than in routes.

pub mod about;
pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod crm;
pub mod errors;
pub mod import;
pub mod quotes;
pub mod settings;
pub mod storefront;
pub mod users;

pub use errors::{ServiceError, ServiceResult};

use crate::domain::auth::AuthenticatedUser;

/// Returns `true` when `role` is among the granted `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|granted| granted == role)
}

/// Fails with [`ServiceError::Unauthorized`] unless `user` holds `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::auth::AuthenticatedUser;
    use crate::domain::user::UserRole;

    pub fn session_user(id: i32, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: id.to_string(),
            email: format!("user{id}@example.com"),
            name: format!("User {id}"),
            roles: role.granted_roles(),
            exp: 0,
        }
    }

    pub fn admin() -> AuthenticatedUser {
        session_user(1, UserRole::Admin)
    }

    pub fn seller() -> AuthenticatedUser {
        session_user(2, UserRole::Seller)
    }

    pub fn anonymous() -> AuthenticatedUser {
        AuthenticatedUser::default()
    }
}
