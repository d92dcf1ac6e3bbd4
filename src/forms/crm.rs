//! Forms for companies (empresas) and contacts (contactos).

use serde::Deserialize;
use validator::Validate;

use crate::domain::crm::{CompanyUpsert, ContactUpsert};
use crate::domain::types::{CompanyId, CompanyName, ContactName, Email};
use crate::forms::catalog::optional_id;
use crate::forms::{FormError, optional_text};

fn optional_email(value: &Option<String>) -> Result<Option<Email>, FormError> {
    optional_text(value)
        .map(Email::new)
        .transpose()
        .map_err(|_| FormError::InvalidEmail)
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating or updating a company through the upsert.
pub struct CompanyForm {
    /// Company name; companies are matched on its normalized form.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Tax identifier (RUT).
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional phone number, kept as typed.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Optional postal address.
    #[validate(length(max = 300))]
    pub address: Option<String>,
}

impl TryFrom<CompanyForm> for CompanyUpsert {
    type Error = FormError;

    fn try_from(form: CompanyForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let name = CompanyName::new(form.name).map_err(|_| FormError::InvalidName)?;
        Ok(CompanyUpsert::new(
            name,
            optional_text(&form.tax_id),
            optional_email(&form.email)?,
            optional_text(&form.phone),
            optional_text(&form.address),
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for a contact, standalone or attached to a company.
pub struct ContactForm {
    /// Identifier of the owning company; blank for standalone contacts.
    pub company_id: Option<String>,
    /// Contact full name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Optional email; contacts with an email are deduplicated on it.
    pub email: Option<String>,
    /// Optional phone number.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Job title inside the company.
    #[validate(length(max = 100))]
    pub position: Option<String>,
}

impl TryFrom<ContactForm> for ContactUpsert {
    type Error = FormError;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let company_id = optional_id(&form.company_id)?
            .map(CompanyId::new)
            .transpose()?;
        let name = ContactName::new(form.name).map_err(|_| FormError::InvalidName)?;
        Ok(ContactUpsert::new(
            company_id,
            name,
            optional_email(&form.email)?,
            optional_text(&form.phone),
            optional_text(&form.position),
        ))
    }
}
