use serde::{Deserialize, Serialize};

use crate::domain::catalog::Product;
use crate::domain::content::BusinessSettings;
use crate::domain::quote::{Quote, QuoteStatus, QuoteWithItems};
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct QuotesQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
}

/// Status value with its display label, for selects and badges.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl From<QuoteStatus> for StatusOption {
    fn from(status: QuoteStatus) -> Self {
        Self {
            value: status.as_str(),
            label: status.label(),
        }
    }
}

pub struct QuotesPageData {
    pub quotes: Paginated<Quote>,
    pub search_query: Option<String>,
    pub status: Option<QuoteStatus>,
    pub statuses: Vec<StatusOption>,
}

pub struct QuoteFormData {
    pub products: Vec<Product>,
    pub settings: BusinessSettings,
}

pub struct QuotePageData {
    pub quote: QuoteWithItems,
    pub status: StatusOption,
    /// Statuses the quote may move to next.
    pub transitions: Vec<StatusOption>,
    pub can_delete: bool,
    pub settings: BusinessSettings,
}

/// Rendered PDF ready to be sent as an attachment.
pub struct QuotePdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
