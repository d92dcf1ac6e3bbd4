//! Simple usage counters.

use serde::Serialize;

use crate::domain::catalog::Product;
use crate::domain::types::{CategoryId, ProductId};

const PRODUCT_VIEW_PREFIX: &str = "product_view:";
const CATEGORY_VIEW_PREFIX: &str = "category_view:";

/// Something worth counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyticsEvent {
    StorefrontView,
    ProductView(ProductId),
    CategoryView(CategoryId),
    QuoteCreated,
    QuotePdfDownloaded,
    SignIn,
}

impl AnalyticsEvent {
    /// Key of the counter row incremented for this event.
    pub fn counter_key(&self) -> String {
        match self {
            AnalyticsEvent::StorefrontView => "storefront_view".to_string(),
            AnalyticsEvent::ProductView(id) => format!("{PRODUCT_VIEW_PREFIX}{id}"),
            AnalyticsEvent::CategoryView(id) => format!("{CATEGORY_VIEW_PREFIX}{id}"),
            AnalyticsEvent::QuoteCreated => "quote_created".to_string(),
            AnalyticsEvent::QuotePdfDownloaded => "quote_pdf_download".to_string(),
            AnalyticsEvent::SignIn => "sign_in".to_string(),
        }
    }

    /// Keys of the counters shown as totals on the dashboard.
    pub fn global_keys() -> Vec<String> {
        [
            AnalyticsEvent::StorefrontView,
            AnalyticsEvent::QuoteCreated,
            AnalyticsEvent::QuotePdfDownloaded,
            AnalyticsEvent::SignIn,
        ]
        .iter()
        .map(AnalyticsEvent::counter_key)
        .collect()
    }
}

/// Prefix shared by all product view counters.
pub fn product_view_prefix() -> &'static str {
    PRODUCT_VIEW_PREFIX
}

/// Extracts the product id from a `product_view:{id}` key.
pub fn product_id_from_key(key: &str) -> Option<ProductId> {
    key.strip_prefix(PRODUCT_VIEW_PREFIX)?
        .parse::<i32>()
        .ok()
        .and_then(|id| ProductId::new(id).ok())
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Counter {
    pub key: String,
    pub count: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProductViews {
    pub product: Product,
    pub views: i64,
}
