//! Customer bookkeeping: companies (empresas) and their contacts (contactos).
//!
//! Both records are written through upserts keyed on a normalized form of
//! their identity so that repeated imports and quotes for the same customer
//! do not create duplicates.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    CompanyId, CompanyName, ContactId, ContactName, Email, normalize_key,
};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub name: CompanyName,
    pub tax_id: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Incoming company data merged into an existing record with the same name key.
#[derive(Clone, Debug, PartialEq)]
pub struct CompanyUpsert {
    pub name: CompanyName,
    pub tax_id: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl CompanyUpsert {
    #[must_use]
    pub fn new(
        name: CompanyName,
        tax_id: Option<String>,
        email: Option<Email>,
        phone: Option<String>,
        address: Option<String>,
    ) -> Self {
        Self {
            name,
            tax_id: clean(tax_id),
            email,
            phone: clean(phone),
            address: clean(address),
        }
    }

    /// Key the company is deduplicated on.
    pub fn name_key(&self) -> String {
        normalize_key(self.name.as_str())
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub company_id: Option<CompanyId>,
    pub name: ContactName,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Incoming contact data merged into an existing record with the same dedup key.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactUpsert {
    pub company_id: Option<CompanyId>,
    pub name: ContactName,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

impl ContactUpsert {
    #[must_use]
    pub fn new(
        company_id: Option<CompanyId>,
        name: ContactName,
        email: Option<Email>,
        phone: Option<String>,
        position: Option<String>,
    ) -> Self {
        Self {
            company_id,
            name,
            email,
            phone: clean(phone),
            position: clean(position),
        }
    }

    /// Email identifies a contact when known; otherwise the normalized name
    /// within its company does.
    pub fn dedup_key(&self) -> String {
        match &self.email {
            Some(email) => format!("email:{}", email.as_str()),
            None => format!(
                "name:{}:{}",
                self.company_id.map(CompanyId::get).unwrap_or(0),
                normalize_key(self.name.as_str())
            ),
        }
    }
}

/// Company together with its contacts, for the detail page.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CompanyWithContacts {
    pub company: Company,
    pub contacts: Vec<Contact>,
}
