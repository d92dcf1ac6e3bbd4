//! Form definitions backing the back-office routes.
//!
//! Each HTML form deserializes into a plain `*Form` struct which is then
//! converted with `TryFrom` into a validated `*Payload` carrying domain types.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod auth;
pub mod catalog;
pub mod content;
pub mod crm;
pub mod import;
pub mod quotes;
pub mod users;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("Error de validación del formulario: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Correo electrónico inválido")]
    InvalidEmail,

    #[error("El nombre es obligatorio")]
    InvalidName,

    #[error("Identificador inválido")]
    InvalidId,

    #[error("Monto inválido: {0}")]
    InvalidAmount(String),

    #[error("El porcentaje debe estar entre 0 y 100")]
    InvalidPercentage,

    #[error("La cantidad debe ser mayor que cero")]
    InvalidQuantity,

    #[error("El valor supera el máximo permitido ({0})")]
    TooLarge(String),

    #[error("URL inválida")]
    InvalidUrl,

    #[error("Rol desconocido")]
    InvalidRole,

    #[error("Estado desconocido")]
    InvalidStatus,

    #[error("La contraseña debe tener al menos {0} caracteres")]
    PasswordTooShort(usize),

    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,

    #[error("La cotización debe tener al menos un ítem")]
    NoItems,

    #[error("Ítem {0}: {1}")]
    InvalidItem(usize, String),

    #[error("Formulario mal formado: {0}")]
    Malformed(String),

    #[error("{0}")]
    Constraint(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::InvalidName,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidAmount(raw) => FormError::InvalidAmount(raw),
            TypeConstraintError::NegativeAmount => {
                FormError::InvalidAmount("no puede ser negativo".to_string())
            }
            TypeConstraintError::PercentageOutOfRange => FormError::InvalidPercentage,
            TypeConstraintError::NonPositiveQuantity => FormError::InvalidQuantity,
            TypeConstraintError::AmountTooLarge(max) => FormError::TooLarge(max.to_string()),
            TypeConstraintError::InvalidValue(message) => FormError::Constraint(message),
        }
    }
}

/// Trims a text input and turns blank values into `None`.
pub(crate) fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Interprets an HTML checkbox value.
pub(crate) fn checkbox(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}
