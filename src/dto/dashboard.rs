use serde::Serialize;

use crate::domain::analytics::ProductViews;
use crate::domain::quote::Quote;

/// Global counter with the label shown on its dashboard card.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CounterCard {
    pub key: String,
    pub label: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: &'static str,
    pub label: &'static str,
    pub count: i64,
}

pub struct DashboardData {
    pub counters: Vec<CounterCard>,
    pub top_products: Vec<ProductViews>,
    pub quotes_by_status: Vec<StatusCount>,
    pub latest_quotes: Vec<Quote>,
}
