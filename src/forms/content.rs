//! Forms for the About page and the business settings.

use serde::Deserialize;
use validator::Validate;

use crate::domain::content::{
    AboutPage, BusinessSettings, validate_quote_prefix, validate_validity_days,
};
use crate::domain::types::{Email, Percentage, WebUrl};
use crate::forms::{FormError, optional_text};

#[derive(Debug, Deserialize)]
/// About page editor; the body is HTML and gets sanitized.
pub struct AboutForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl From<AboutForm> for AboutPage {
    fn from(form: AboutForm) -> Self {
        AboutPage::new(&form.title, &form.body)
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for the business settings printed on quotes.
pub struct SettingsForm {
    /// Business name shown in the header of quotes and the storefront.
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    /// Tax identifier (RUT).
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    /// Postal address.
    #[validate(length(max = 300))]
    pub address: Option<String>,
    /// Phone number.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Optional public email.
    pub email: Option<String>,
    /// Optional public website.
    pub website: Option<String>,
    /// IVA rate applied to new quotes, `0..=100`.
    pub iva_rate: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Prefix of quote numbers, 1-10 ASCII letters or digits.
    pub quote_prefix: String,
    /// Days a new quote stays valid, `1..=365`.
    pub quote_validity_days: String,
    /// Free text printed at the bottom of every quote.
    #[validate(length(max = 1000))]
    pub quote_footer: Option<String>,
}

fn validate_currency(raw: &str) -> Result<String, FormError> {
    let currency = raw.trim().to_ascii_uppercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency)
    } else {
        Err(FormError::Constraint(format!(
            "Moneda inválida: {}",
            raw.trim()
        )))
    }
}

impl TryFrom<SettingsForm> for BusinessSettings {
    type Error = FormError;

    fn try_from(form: SettingsForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let company_name = form.company_name.trim().to_string();
        if company_name.is_empty() {
            return Err(FormError::InvalidName);
        }

        let validity = form.quote_validity_days.trim().parse::<i32>().map_err(|_| {
            FormError::Constraint(format!(
                "Días de validez inválidos: {}",
                form.quote_validity_days.trim()
            ))
        })?;

        Ok(BusinessSettings {
            company_name,
            tax_id: optional_text(&form.tax_id),
            address: optional_text(&form.address),
            phone: optional_text(&form.phone),
            email: optional_text(&form.email)
                .map(Email::new)
                .transpose()
                .map_err(|_| FormError::InvalidEmail)?,
            website: optional_text(&form.website)
                .map(WebUrl::new)
                .transpose()?,
            iva_rate: Percentage::parse(&form.iva_rate)?,
            currency: validate_currency(&form.currency)?,
            quote_prefix: validate_quote_prefix(&form.quote_prefix)?,
            quote_validity_days: validate_validity_days(validity)?,
            quote_footer: optional_text(&form.quote_footer),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn form() -> SettingsForm {
        SettingsForm {
            company_name: "Ferretería Central".to_string(),
            tax_id: Some("76.543.210-K".to_string()),
            address: None,
            phone: None,
            email: Some("ventas@central.cl".to_string()),
            website: Some("".to_string()),
            iva_rate: "19".to_string(),
            currency: "clp".to_string(),
            quote_prefix: "fc".to_string(),
            quote_validity_days: "30".to_string(),
            quote_footer: None,
        }
    }

    #[test]
    fn settings_form_is_normalized() {
        let settings = BusinessSettings::try_from(form()).unwrap();
        assert_eq!(settings.iva_rate.get(), Decimal::new(19, 0));
        assert_eq!(settings.currency, "CLP");
        assert_eq!(settings.quote_prefix, "FC");
        assert_eq!(settings.quote_validity_days, 30);
        assert_eq!(settings.website, None);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut iva = form();
        iva.iva_rate = "101".to_string();
        assert!(matches!(
            BusinessSettings::try_from(iva),
            Err(FormError::InvalidPercentage)
        ));

        let mut days = form();
        days.quote_validity_days = "0".to_string();
        assert!(BusinessSettings::try_from(days).is_err());

        let mut prefix = form();
        prefix.quote_prefix = "COT-".to_string();
        assert!(BusinessSettings::try_from(prefix).is_err());
    }

    #[test]
    fn footer_text_is_stored_as_typed() {
        let mut form = form();
        form.company_name = "Pérez & Hijos".to_string();
        form.quote_footer = Some("Transferencia a Banco A & B".to_string());
        let settings = BusinessSettings::try_from(form).unwrap();
        assert_eq!(settings.company_name, "Pérez & Hijos");
        assert_eq!(
            settings.quote_footer.as_deref(),
            Some("Transferencia a Banco A & B")
        );
    }

    #[test]
    fn about_form_defaults_title() {
        let page = AboutPage::from(AboutForm {
            title: String::new(),
            body: "<p>Somos una empresa familiar.</p>".to_string(),
        });
        assert_eq!(page.title, "Sobre nosotros");
        assert_eq!(page.body, "<p>Somos una empresa familiar.</p>");
    }
}
