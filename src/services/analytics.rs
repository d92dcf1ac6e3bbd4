//! Usage counters and the back-office dashboard.

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::quote::QuoteStatus;
use crate::domain::user::SELLER_ROLE;
use crate::dto::dashboard::{CounterCard, DashboardData, StatusCount};
use crate::repository::{AnalyticsReader, AnalyticsWriter, QuoteListQuery, QuoteReader};
use crate::services::{ServiceResult, ensure_role};

/// Products listed in the dashboard's most viewed table.
pub const TOP_PRODUCTS: usize = 10;
/// Quotes listed in the dashboard's latest quotes table.
pub const LATEST_QUOTES: usize = 5;

/// Increments the counter for `event`. Failures are logged, never returned.
pub fn record<R>(repo: &R, event: AnalyticsEvent)
where
    R: AnalyticsWriter + ?Sized,
{
    let key = event.counter_key();
    if let Err(err) = repo.increment_counter(&key) {
        log::error!("Failed to record analytics event {key}: {err}");
    }
}

fn counter_label(key: &str) -> &'static str {
    match key {
        "storefront_view" => "Visitas al catálogo",
        "quote_created" => "Cotizaciones creadas",
        "quote_pdf_download" => "PDF descargados",
        "sign_in" => "Inicios de sesión",
        _ => "Otros",
    }
}

/// Loads counters, top products and quote statistics for the dashboard.
pub fn load_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DashboardData>
where
    R: AnalyticsReader + QuoteReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let counters = repo
        .list_counters(&AnalyticsEvent::global_keys())
        .map_err(|err| {
            log::error!("Failed to load counters: {err}");
            err
        })?
        .into_iter()
        .map(|counter| CounterCard {
            label: counter_label(&counter.key),
            key: counter.key,
            count: counter.count,
        })
        .collect();

    let top_products = repo.top_product_views(TOP_PRODUCTS)?;

    let counts = repo.count_quotes_by_status()?;
    let quotes_by_status = QuoteStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status: status.as_str(),
            label: status.label(),
            count: counts
                .iter()
                .find(|(counted, _)| *counted == status)
                .map(|(_, count)| *count)
                .unwrap_or(0),
        })
        .collect();

    let (_, latest_quotes) = repo.list_quotes(QuoteListQuery::new().paginate(1, LATEST_QUOTES))?;

    Ok(DashboardData {
        counters,
        top_products,
        quotes_by_status,
        latest_quotes,
    })
}
