//! Sign-in form.

use serde::Deserialize;

use crate::domain::types::Email;
use crate::forms::FormError;

/// Credentials posted by the sign-in page.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

pub struct SignInPayload {
    pub email: Email,
    pub password: String,
}

impl TryFrom<SignInForm> for SignInPayload {
    type Error = FormError;

    fn try_from(form: SignInForm) -> Result<Self, Self::Error> {
        let email = Email::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        Ok(Self {
            email,
            password: form.password,
        })
    }
}
