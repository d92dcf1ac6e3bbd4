//! Password hashing and sign-in.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use uuid::Uuid;

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::auth::AuthenticatedUser;
use crate::forms::auth::{SignInForm, SignInPayload};
use crate::repository::{AnalyticsWriter, UserReader};
use crate::services::analytics::record;
use crate::services::{ServiceError, ServiceResult};

/// Hashes `password` into an argon2 PHC string with a random salt.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ServiceError::Internal(format!("salt generation failed: {e}")))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::error!("Stored password hash is malformed: {err}");
            false
        }
    }
}

/// Authenticates an active user and returns the claims for the session.
///
/// Unknown emails, inactive accounts and wrong passwords all produce
/// [`ServiceError::Unauthorized`].
pub fn sign_in<R>(repo: &R, form: SignInForm, ttl_hours: i64) -> ServiceResult<AuthenticatedUser>
where
    R: UserReader + AnalyticsWriter + ?Sized,
{
    let payload = SignInPayload::try_from(form).map_err(|_| ServiceError::Unauthorized)?;

    let user = repo
        .get_user_by_email(&payload.email)
        .map_err(|err| {
            log::error!("Failed to load user for sign-in: {err}");
            err
        })?
        .filter(|user| user.is_active)
        .ok_or(ServiceError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash) {
        log::info!("Rejected sign-in for {}", user.email);
        return Err(ServiceError::Unauthorized);
    }

    record(repo, AnalyticsEvent::SignIn);

    Ok(AuthenticatedUser::for_user(&user, ttl_hours))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{Email, UserId, UserName};
    use crate::domain::user::{User, UserRole};
    use crate::repository::mock::MockRepository;

    fn stored_user(password: &str, is_active: bool) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(3).unwrap(),
            email: Email::new("ventas@example.com").unwrap(),
            name: UserName::new("Ventas").unwrap(),
            password_hash: hash_password(password).unwrap(),
            role: UserRole::Seller,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn form(email: &str, password: &str) -> SignInForm {
        SignInForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn hashes_verify_and_differ_per_salt() {
        let first = hash_password("correcto-1").unwrap();
        let second = hash_password("correcto-1").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("correcto-1", &first));
        assert!(!verify_password("incorrecto", &first));
        assert!(!verify_password("correcto-1", "not-a-phc-string"));
    }

    #[test]
    fn sign_in_returns_claims_and_records_event() {
        let user = stored_user("secreto123", true);
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .withf(|email| email.as_str() == "ventas@example.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_increment_counter()
            .withf(|key| key == "sign_in")
            .times(1)
            .returning(|_| Ok(()));

        let claims = sign_in(&repo, form(" Ventas@Example.com ", "secreto123"), 12).unwrap();

        assert_eq!(claims.sub, "3");
        assert_eq!(claims.roles, vec!["seller".to_string()]);
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let user = stored_user("secreto123", true);
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_increment_counter().times(0);

        let result = sign_in(&repo, form("ventas@example.com", "otra-cosa"), 12);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn inactive_or_unknown_user_is_unauthorized() {
        let user = stored_user("secreto123", false);
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = sign_in(&repo, form("ventas@example.com", "secreto123"), 12);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        let result = sign_in(&repo, form("nadie@example.com", "secreto123"), 12);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
