//! Domain aggregates exposed by the service layer.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod content;
pub mod crm;
pub mod quote;
pub mod types;
pub mod user;
