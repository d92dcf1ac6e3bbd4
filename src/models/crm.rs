//! Diesel models for companies and contacts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::crm::{
    Company as DomainCompany, CompanyUpsert, Contact as DomainContact, ContactUpsert,
};
use crate::domain::types::{
    CompanyId, CompanyName, ContactId, ContactName, Email, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::companies)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub name_key: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::companies)]
pub struct NewCompany<'a> {
    pub name: &'a str,
    pub name_key: String,
    pub tax_id: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Company, foreign_key = company_id))]
#[diesel(table_name = crate::schema::contacts)]
pub struct Contact {
    pub id: i32,
    pub company_id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub dedup_key: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contacts)]
pub struct NewContact<'a> {
    pub company_id: Option<i32>,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub position: Option<&'a str>,
    pub dedup_key: String,
}

impl TryFrom<Company> for DomainCompany {
    type Error = TypeConstraintError;

    fn try_from(company: Company) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CompanyId::try_from(company.id)?,
            name: CompanyName::new(company.name)?,
            tax_id: company.tax_id,
            email: company.email.map(Email::new).transpose()?,
            phone: company.phone,
            address: company.address,
            created_at: company.created_at,
            updated_at: company.updated_at,
        })
    }
}

impl<'a> From<&'a CompanyUpsert> for NewCompany<'a> {
    fn from(company: &'a CompanyUpsert) -> Self {
        Self {
            name: company.name.as_str(),
            name_key: company.name_key(),
            tax_id: company.tax_id.as_deref(),
            email: company.email.as_ref().map(Email::as_str),
            phone: company.phone.as_deref(),
            address: company.address.as_deref(),
        }
    }
}

impl TryFrom<Contact> for DomainContact {
    type Error = TypeConstraintError;

    fn try_from(contact: Contact) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactId::try_from(contact.id)?,
            company_id: contact.company_id.map(CompanyId::try_from).transpose()?,
            name: ContactName::new(contact.name)?,
            email: contact.email.map(Email::new).transpose()?,
            phone: contact.phone,
            position: contact.position,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        })
    }
}

impl<'a> From<&'a ContactUpsert> for NewContact<'a> {
    fn from(contact: &'a ContactUpsert) -> Self {
        Self {
            company_id: contact.company_id.map(CompanyId::get),
            name: contact.name.as_str(),
            email: contact.email.as_ref().map(Email::as_str),
            phone: contact.phone.as_deref(),
            position: contact.position.as_deref(),
            dedup_key: contact.dedup_key(),
        }
    }
}
