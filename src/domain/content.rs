//! Editable site content and business settings (singleton records).

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{Email, Percentage, TypeConstraintError, WebUrl};
use rust_decimal::Decimal;

pub const DEFAULT_ABOUT_TITLE: &str = "Sobre nosotros";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AboutPage {
    pub title: String,
    /// Sanitized HTML.
    pub body: String,
    pub updated_at: Option<NaiveDateTime>,
}

impl Default for AboutPage {
    fn default() -> Self {
        Self {
            title: DEFAULT_ABOUT_TITLE.to_string(),
            body: String::new(),
            updated_at: None,
        }
    }
}

impl AboutPage {
    /// Builds page content, sanitizing the HTML body. The title is plain text.
    pub fn new(title: &str, body: &str) -> Self {
        let title = title.trim();
        Self {
            title: if title.is_empty() {
                DEFAULT_ABOUT_TITLE.to_string()
            } else {
                title.to_string()
            },
            body: ammonia::clean(body.trim()),
            updated_at: None,
        }
    }
}

/// Business data printed on quotations plus quoting defaults.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BusinessSettings {
    pub company_name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub website: Option<WebUrl>,
    pub iva_rate: Percentage,
    pub currency: String,
    pub quote_prefix: String,
    pub quote_validity_days: i32,
    pub quote_footer: Option<String>,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            company_name: "Mi Empresa".to_string(),
            tax_id: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            iva_rate: Percentage::new(Decimal::from(19)).unwrap_or_default(),
            currency: "CLP".to_string(),
            quote_prefix: "COT".to_string(),
            quote_validity_days: 15,
            quote_footer: None,
        }
    }
}

/// Validates a quote prefix: 1-10 ASCII letters or digits, stored upper-case.
pub fn validate_quote_prefix(prefix: &str) -> Result<String, TypeConstraintError> {
    let prefix = prefix.trim();
    if prefix.is_empty()
        || prefix.len() > 10
        || !prefix.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(TypeConstraintError::InvalidValue(format!(
            "invalid quote prefix '{prefix}'"
        )));
    }
    Ok(prefix.to_ascii_uppercase())
}

/// Validates the number of days a quote stays valid.
pub fn validate_validity_days(days: i32) -> Result<i32, TypeConstraintError> {
    if (1..=365).contains(&days) {
        Ok(days)
    } else {
        Err(TypeConstraintError::InvalidValue(format!(
            "validity must be between 1 and 365 days, got {days}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_body_is_sanitized() {
        let page = AboutPage::new("  ", "<p>Hola</p><script>alert(1)</script>");
        assert_eq!(page.title, DEFAULT_ABOUT_TITLE);
        assert_eq!(page.body, "<p>Hola</p>");
    }

    #[test]
    fn quote_prefix_rules() {
        assert_eq!(validate_quote_prefix(" cot "), Ok("COT".to_string()));
        assert!(validate_quote_prefix("").is_err());
        assert!(validate_quote_prefix("CO-T").is_err());
        assert!(validate_quote_prefix("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn default_settings_use_19_percent_iva() {
        let settings = BusinessSettings::default();
        assert_eq!(settings.iva_rate.get(), Decimal::from(19));
        assert_eq!(settings.quote_validity_days, 15);
        assert!(validate_validity_days(0).is_err());
    }
}
