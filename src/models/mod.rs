//! Database models shared across the repository layer.

pub mod analytics;
pub mod catalog;
#[cfg(feature = "server")]
pub mod config;
pub mod content;
pub mod crm;
pub mod quote;
pub mod user;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::types::TypeConstraintError;

/// Parses a decimal stored as TEXT.
pub(crate) fn parse_stored_decimal(value: &str) -> Result<Decimal, TypeConstraintError> {
    Decimal::from_str(value.trim())
        .map_err(|_| TypeConstraintError::InvalidAmount(value.to_string()))
}
