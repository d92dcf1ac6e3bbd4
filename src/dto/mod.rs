//! DTO modules that bridge services with templates and APIs.

pub mod catalog;
pub mod crm;
pub mod dashboard;
pub mod import;
pub mod quotes;
pub mod storefront;
pub mod users;
