//! Diesel models for the singleton content rows: about page and business settings.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::content::{AboutPage as DomainAboutPage, BusinessSettings as DomainSettings};
use crate::domain::types::{Email, Percentage, TypeConstraintError, WebUrl};
use crate::models::parse_stored_decimal;

/// Primary key of every singleton row.
pub const SINGLETON_ID: i32 = 1;

#[derive(Debug, Clone, Identifiable, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::about_page)]
pub struct AboutPage {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::business_settings)]
#[diesel(treat_none_as_null = true)]
pub struct BusinessSettings {
    pub id: i32,
    pub company_name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub iva_rate: String,
    pub currency: String,
    pub quote_prefix: String,
    pub quote_validity_days: i32,
    pub quote_footer: Option<String>,
}

impl From<AboutPage> for DomainAboutPage {
    fn from(page: AboutPage) -> Self {
        Self {
            title: page.title,
            body: page.body,
            updated_at: Some(page.updated_at),
        }
    }
}

impl AboutPage {
    pub fn from_domain(page: &DomainAboutPage, updated_at: NaiveDateTime) -> Self {
        Self {
            id: SINGLETON_ID,
            title: page.title.clone(),
            body: page.body.clone(),
            updated_at,
        }
    }
}

impl TryFrom<BusinessSettings> for DomainSettings {
    type Error = TypeConstraintError;

    fn try_from(settings: BusinessSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            company_name: settings.company_name,
            tax_id: settings.tax_id,
            address: settings.address,
            phone: settings.phone,
            email: settings.email.map(Email::new).transpose()?,
            website: settings.website.map(WebUrl::new).transpose()?,
            iva_rate: Percentage::new(parse_stored_decimal(&settings.iva_rate)?)?,
            currency: settings.currency,
            quote_prefix: settings.quote_prefix,
            quote_validity_days: settings.quote_validity_days,
            quote_footer: settings.quote_footer,
        })
    }
}

impl From<&DomainSettings> for BusinessSettings {
    fn from(settings: &DomainSettings) -> Self {
        Self {
            id: SINGLETON_ID,
            company_name: settings.company_name.clone(),
            tax_id: settings.tax_id.clone(),
            address: settings.address.clone(),
            phone: settings.phone.clone(),
            email: settings.email.as_ref().map(|e| e.as_str().to_string()),
            website: settings.website.as_ref().map(|w| w.as_str().to_string()),
            iva_rate: settings.iva_rate.get().to_string(),
            currency: settings.currency.clone(),
            quote_prefix: settings.quote_prefix.clone(),
            quote_validity_days: settings.quote_validity_days,
            quote_footer: settings.quote_footer.clone(),
        }
    }
}
