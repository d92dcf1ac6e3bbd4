use serde::Deserialize;

use crate::domain::crm::{Company, Contact};
use crate::domain::quote::Quote;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct CompaniesQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

pub struct CompaniesPageData {
    pub companies: Paginated<Company>,
    pub search_query: Option<String>,
}

pub struct CompanyPageData {
    pub company: Company,
    pub contacts: Vec<Contact>,
    pub quotes: Vec<Quote>,
}

pub struct ContactPageData {
    pub contact: Contact,
    pub company: Option<Company>,
}
