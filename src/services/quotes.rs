//! Quotation (cotización) workflows.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::catalog::Product;
use crate::domain::crm::{CompanyUpsert, ContactUpsert};
use crate::domain::quote::{NewQuote, Quote, QuoteCustomer, QuoteItemDraft, QuoteStatus};
use crate::domain::types::{
    CompanyId, ContactId, ContactName, CustomerName, ItemDescription, ProductId, QuoteId, UserId,
};
use crate::domain::user::SELLER_ROLE;
use crate::dto::quotes::{
    QuoteFormData, QuotePageData, QuotePdf, QuotesPageData, QuotesQuery, StatusOption,
};
use crate::forms::FormError;
use crate::forms::quotes::{QuoteForm, QuoteLineInput, QuotePayload, QuoteStatusForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::pdf::render_quote;
use crate::repository::{
    AnalyticsWriter, CompanyWriter, ContentReader, ProductListQuery, ProductReader,
    QuoteListQuery, QuoteReader, QuoteWriter,
};
use crate::services::analytics::record;
use crate::services::catalog::search_term;
use crate::services::settings::current_settings;
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub fn list_quotes<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: QuotesQuery,
) -> ServiceResult<QuotesPageData>
where
    R: QuoteReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let page = query.page.unwrap_or(1);
    let mut list_query = QuoteListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let search_query = search_term(query.search);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    // Unknown status values from the query string are ignored.
    let status = search_term(query.status).and_then(|raw| QuoteStatus::try_from(raw.as_str()).ok());
    if let Some(status) = status {
        list_query = list_query.status(status);
    }

    let (total, quotes) = repo.list_quotes(list_query).map_err(|err| {
        log::error!("Failed to list quotes: {err}");
        err
    })?;

    Ok(QuotesPageData {
        quotes: Paginated::from_total(quotes, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
        status,
        statuses: QuoteStatus::ALL.into_iter().map(StatusOption::from).collect(),
    })
}

/// Loads the product picker and settings for the new quote form.
pub fn load_new_quote<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<QuoteFormData>
where
    R: ProductReader + ContentReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let (_, products) = repo.list_products(ProductListQuery::new())?;
    let settings = current_settings(repo)?;

    Ok(QuoteFormData { products, settings })
}

/// Fills blank description and price from the referenced product.
fn build_item(
    index: usize,
    line: QuoteLineInput,
    products: &HashMap<ProductId, Product>,
) -> ServiceResult<QuoteItemDraft> {
    let row = index + 1;
    let product = match line.product_id {
        Some(id) => Some(products.get(&id).ok_or_else(|| {
            ServiceError::Form(format!("Ítem {row}: el producto no existe"))
        })?),
        None => None,
    };

    let description = match (line.description, product) {
        (Some(description), _) => description,
        (None, Some(product)) => product.name.as_str().to_string(),
        (None, None) => {
            return Err(ServiceError::Form(format!("Ítem {row}: falta la descripción")));
        }
    };
    let description = ItemDescription::new(description)
        .map_err(|_| ServiceError::Form(format!("Ítem {row}: falta la descripción")))?;

    let unit_price = line
        .unit_price
        .or_else(|| product.map(|product| product.price))
        .ok_or_else(|| ServiceError::Form(format!("Ítem {row}: falta el precio unitario")))?;

    QuoteItemDraft::try_new(
        line.product_id,
        description,
        line.quantity,
        unit_price,
        line.discount_percent,
    )
    .map_err(|err| ServiceError::Form(format!("Ítem {row}: {}", FormError::from(err))))
}

/// Upserts the company and contact named on the form and builds the
/// customer snapshot printed on the quote.
fn link_customer<R>(repo: &R, payload: &QuotePayload) -> ServiceResult<QuoteCustomer>
where
    R: CompanyWriter + ?Sized,
{
    let has_contact = payload.contact_name.is_some() || payload.email.is_some();

    let company_id: Option<CompanyId> = match &payload.company_name {
        Some(name) => {
            let upsert = CompanyUpsert::new(
                name.clone(),
                payload.tax_id.clone(),
                None,
                if has_contact { None } else { payload.phone.clone() },
                None,
            );
            Some(repo.upsert_company(&upsert)?.id)
        }
        None => None,
    };

    // A contact known only by email is filed under the address itself.
    let contact_name = match (&payload.contact_name, &payload.email) {
        (Some(name), _) => Some(name.clone()),
        (None, Some(email)) => Some(ContactName::new(email.as_str())?),
        (None, None) => None,
    };
    let contact_id: Option<ContactId> = match &contact_name {
        Some(name) => {
            let upsert = ContactUpsert::new(
                company_id,
                name.clone(),
                payload.email.clone(),
                payload.phone.clone(),
                None,
            );
            Some(repo.upsert_contact(&upsert)?.id)
        }
        None => None,
    };

    let customer_name = match (&payload.company_name, &contact_name) {
        (Some(company), _) => CustomerName::new(company.as_str())?,
        (None, Some(contact)) => CustomerName::new(contact.as_str())?,
        (None, None) => {
            return Err(ServiceError::Form(
                "Indique la empresa, el contacto o el correo del cliente".to_string(),
            ));
        }
    };

    Ok(QuoteCustomer {
        company_id,
        contact_id,
        name: customer_name,
        email: payload.email.clone(),
        phone: payload.phone.clone(),
    })
}

/// Validates the form, links the customer in the CRM and stores the quote
/// under the next sequence number.
pub fn create_quote<R>(repo: &R, user: &AuthenticatedUser, form: QuoteForm) -> ServiceResult<Quote>
where
    R: ProductReader + CompanyWriter + QuoteWriter + ContentReader + AnalyticsWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let created_by = user
        .user_id()
        .and_then(|id| UserId::new(id).ok())
        .ok_or(ServiceError::Unauthorized)?;

    let payload = QuotePayload::try_from(form)?;
    let settings = current_settings(repo)?;

    let product_ids: Vec<ProductId> = payload
        .lines
        .iter()
        .filter_map(|line| line.product_id)
        .collect();
    let products: HashMap<ProductId, Product> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        repo.get_products_by_ids(&product_ids)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect()
    };

    let items = payload
        .lines
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, line)| build_item(index, line, &products))
        .collect::<ServiceResult<Vec<_>>>()?;

    let customer = link_customer(repo, &payload).map_err(|err| {
        log::error!("Failed to link quote customer: {err}");
        err
    })?;

    let valid_until =
        Utc::now().date_naive() + Duration::days(i64::from(settings.quote_validity_days));

    let new_quote = NewQuote::try_new(
        customer,
        payload.notes.clone(),
        payload.discount_percent,
        settings.iva_rate,
        items,
        valid_until,
        created_by,
    )?;

    let quote = repo
        .create_quote(&new_quote, &settings.quote_prefix)
        .map_err(|err| {
            log::error!("Failed to create quote: {err}");
            err
        })?;

    record(repo, AnalyticsEvent::QuoteCreated);
    log::info!("Created quote {} for {}", quote.number, quote.customer.name);

    Ok(quote)
}

pub fn show_quote<R>(
    repo: &R,
    user: &AuthenticatedUser,
    quote_id: i32,
) -> ServiceResult<QuotePageData>
where
    R: QuoteReader + ContentReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let quote = repo
        .get_quote_by_id(QuoteId::new(quote_id)?)?
        .ok_or(ServiceError::NotFound)?;
    let current = quote.quote.status;

    Ok(QuotePageData {
        status: StatusOption::from(current),
        transitions: QuoteStatus::ALL
            .into_iter()
            .filter(|next| current.can_transition_to(*next))
            .map(StatusOption::from)
            .collect(),
        can_delete: current == QuoteStatus::Draft,
        settings: current_settings(repo)?,
        quote,
    })
}

/// Moves a quote along its lifecycle; invalid transitions are form errors.
pub fn change_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    quote_id: i32,
    form: QuoteStatusForm,
) -> ServiceResult<Quote>
where
    R: QuoteReader + QuoteWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let quote_id = QuoteId::new(quote_id)?;
    let next = QuoteStatus::try_from(form)?;
    let current = repo
        .get_quote_by_id(quote_id)?
        .ok_or(ServiceError::NotFound)?
        .quote
        .status;

    if !current.can_transition_to(next) {
        return Err(ServiceError::Form(format!(
            "No se puede pasar de {} a {}",
            current.label(),
            next.label()
        )));
    }

    repo.update_quote_status(quote_id, next).map_err(|err| {
        log::error!("Failed to update quote {quote_id}: {err}");
        err.into()
    })
}

/// Deletes a quote. Only drafts can be deleted so issued numbers stay on record.
pub fn delete_quote<R>(repo: &R, user: &AuthenticatedUser, quote_id: i32) -> ServiceResult<()>
where
    R: QuoteReader + QuoteWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let quote_id = QuoteId::new(quote_id)?;
    let quote = repo
        .get_quote_by_id(quote_id)?
        .ok_or(ServiceError::NotFound)?;

    if quote.quote.status != QuoteStatus::Draft {
        return Err(ServiceError::Form(
            "Solo se pueden eliminar cotizaciones en borrador".to_string(),
        ));
    }

    repo.delete_quote(quote_id).map_err(|err| {
        log::error!("Failed to delete quote {quote_id}: {err}");
        err
    })?;

    Ok(())
}

/// Renders the quote as a PDF attachment.
pub fn quote_pdf<R>(repo: &R, user: &AuthenticatedUser, quote_id: i32) -> ServiceResult<QuotePdf>
where
    R: QuoteReader + ContentReader + AnalyticsWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let quote = repo
        .get_quote_by_id(QuoteId::new(quote_id)?)?
        .ok_or(ServiceError::NotFound)?;
    let settings = current_settings(repo)?;

    let bytes = render_quote(&quote, &settings).map_err(|err| {
        log::error!("Failed to render PDF for {}: {err}", quote.quote.number);
        ServiceError::Internal(err.to_string())
    })?;

    record(repo, AnalyticsEvent::QuotePdfDownloaded);

    Ok(QuotePdf {
        file_name: format!("{}.pdf", quote.quote.number),
        bytes,
    })
}
