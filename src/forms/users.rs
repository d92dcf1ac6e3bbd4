//! Forms for the user administration page.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{Email, UserName};
use crate::domain::user::UserRole;
use crate::forms::FormError;

/// Shortest password accepted for a back-office account.
pub const MIN_PASSWORD_LEN: usize = 8;

fn check_password(password: &str) -> Result<(), FormError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddUserForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub password: String,
    pub role: String,
}

pub struct AddUserPayload {
    pub email: Email,
    pub name: UserName,
    pub password: String,
    pub role: UserRole,
}

impl TryFrom<AddUserForm> for AddUserPayload {
    type Error = FormError;

    fn try_from(form: AddUserForm) -> Result<Self, Self::Error> {
        form.validate()?;
        check_password(&form.password)?;

        Ok(Self {
            email: Email::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            name: UserName::new(form.name).map_err(|_| FormError::InvalidName)?,
            password: form.password,
            role: UserRole::try_from(form.role.as_str()).map_err(|_| FormError::InvalidRole)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

impl ResetPasswordForm {
    /// Returns the new password once both inputs agree and it is long enough.
    pub fn into_password(self) -> Result<String, FormError> {
        if self.password != self.password_confirm {
            return Err(FormError::PasswordMismatch);
        }
        check_password(&self.password)?;
        Ok(self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, role: &str) -> AddUserForm {
        AddUserForm {
            email: "nuevo@example.com".to_string(),
            name: "Nuevo".to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn valid_form_becomes_payload() {
        let payload = AddUserPayload::try_from(form("12345678", "admin")).unwrap();
        assert_eq!(payload.role, UserRole::Admin);
        assert_eq!(payload.email.as_str(), "nuevo@example.com");
    }

    #[test]
    fn short_password_is_rejected() {
        let result = AddUserPayload::try_from(form("1234567", "seller"));
        assert!(matches!(result, Err(FormError::PasswordTooShort(8))));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = AddUserPayload::try_from(form("12345678", "root"));
        assert!(matches!(result, Err(FormError::InvalidRole)));
    }

    #[test]
    fn reset_requires_matching_passwords() {
        let mismatch = ResetPasswordForm {
            password: "abcdefgh".to_string(),
            password_confirm: "abcdefgX".to_string(),
        };
        assert!(matches!(
            mismatch.into_password(),
            Err(FormError::PasswordMismatch)
        ));

        let ok = ResetPasswordForm {
            password: "abcdefgh".to_string(),
            password_confirm: "abcdefgh".to_string(),
        };
        assert_eq!(ok.into_password().unwrap(), "abcdefgh");
    }
}
