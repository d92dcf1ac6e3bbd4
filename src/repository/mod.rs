//! Persistence traits and their Diesel implementation.
//!
//! Services depend on the narrow reader/writer traits below so they can be
//! exercised against [`mock::MockRepository`] in tests, while the application
//! wires in [`DieselRepository`].

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::analytics::{Counter, ProductViews};
use crate::domain::catalog::{Category, CategoryWithCount, NewCategory, Product, ProductDraft};
use crate::domain::content::{AboutPage, BusinessSettings};
use crate::domain::crm::{Company, CompanyUpsert, Contact, ContactUpsert};
use crate::domain::quote::{NewQuote, Quote, QuoteStatus, QuoteWithItems};
use crate::domain::types::{
    CategoryId, CompanyId, ContactId, Email, ProductId, QuoteId, Slug, UserId,
};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;

pub mod analytics;
pub mod catalog;
pub mod content;
pub mod crm;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod quote;
pub mod user;

#[derive(Clone)]
/// Repository backed by the pooled SQLite connection.
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows to skip; absurd page numbers saturate and yield an empty page.
    fn offset(&self) -> i64 {
        let skipped = (self.page.max(1) - 1).saturating_mul(self.per_page);
        i64::try_from(skipped).unwrap_or(i64::MAX)
    }

    fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

/// Escape character for the patterns built by [`contains_pattern`].
pub(crate) const LIKE_ESCAPE: char = '\\';

/// Escapes the `LIKE` wildcards `%` and `_` so they match literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Builds a `LIKE` pattern matching `term` anywhere.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub published_only: bool,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to products visible on the storefront.
    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyListQuery {
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CompanyListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteListQuery {
    pub search: Option<String>,
    pub status: Option<QuoteStatus>,
    pub company_id: Option<CompanyId>,
    pub pagination: Option<Pagination>,
}

impl QuoteListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
    fn list_users(&self) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn set_user_active(&self, id: UserId, is_active: bool) -> RepositoryResult<User>;
    fn set_user_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()>;
}

pub trait CategoryReader {
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Category>>;
    fn list_categories(&self) -> RepositoryResult<Vec<CategoryWithCount>>;
}

pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(&self, id: CategoryId, updates: &NewCategory)
    -> RepositoryResult<Category>;
    /// Products in the category become uncategorised.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<()>;
    /// Returns the category with the same slug, creating it when missing.
    fn get_or_create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
}

pub trait ProductReader {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    fn get_product_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Product>>;
    fn get_products_by_ids(&self, ids: &[ProductId]) -> RepositoryResult<Vec<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
}

pub trait ProductWriter {
    /// Inserts the product under a unique slug derived from its name.
    fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product>;
    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> RepositoryResult<Product>;
    fn delete_product(&self, id: ProductId) -> RepositoryResult<()>;
    /// Updates the product with the same SKU or inserts a new one.
    fn upsert_product_by_sku(&self, draft: &ProductDraft) -> RepositoryResult<Product>;
}

pub trait CompanyReader {
    fn get_company_by_id(&self, id: CompanyId) -> RepositoryResult<Option<Company>>;
    fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)>;
    fn get_contact_by_id(&self, id: ContactId) -> RepositoryResult<Option<Contact>>;
    fn list_company_contacts(&self, company_id: CompanyId) -> RepositoryResult<Vec<Contact>>;
}

pub trait CompanyWriter {
    /// Merges into the company with the same normalized name or inserts it.
    fn upsert_company(&self, company: &CompanyUpsert) -> RepositoryResult<Company>;
    fn delete_company(&self, id: CompanyId) -> RepositoryResult<()>;
    /// Merges into the contact with the same dedup key or inserts it.
    fn upsert_contact(&self, contact: &ContactUpsert) -> RepositoryResult<Contact>;
    /// Overwrites every field of the contact, clearing values left empty.
    fn update_contact(&self, id: ContactId, contact: &ContactUpsert) -> RepositoryResult<Contact>;
    fn delete_contact(&self, id: ContactId) -> RepositoryResult<()>;
}

pub trait QuoteReader {
    fn get_quote_by_id(&self, id: QuoteId) -> RepositoryResult<Option<QuoteWithItems>>;
    fn list_quotes(&self, query: QuoteListQuery) -> RepositoryResult<(usize, Vec<Quote>)>;
    fn count_quotes_by_status(&self) -> RepositoryResult<Vec<(QuoteStatus, i64)>>;
}

pub trait QuoteWriter {
    /// Assigns the next sequence number and stores the quote with its items.
    fn create_quote(&self, new_quote: &NewQuote, prefix: &str) -> RepositoryResult<Quote>;
    fn update_quote_status(&self, id: QuoteId, status: QuoteStatus) -> RepositoryResult<Quote>;
    fn delete_quote(&self, id: QuoteId) -> RepositoryResult<()>;
}

pub trait AnalyticsReader {
    fn list_counters(&self, keys: &[String]) -> RepositoryResult<Vec<Counter>>;
    fn top_product_views(&self, limit: usize) -> RepositoryResult<Vec<ProductViews>>;
}

pub trait AnalyticsWriter {
    fn increment_counter(&self, key: &str) -> RepositoryResult<()>;
}

pub trait ContentReader {
    fn get_about_page(&self) -> RepositoryResult<Option<AboutPage>>;
    fn get_settings(&self) -> RepositoryResult<Option<BusinessSettings>>;
}

pub trait ContentWriter {
    fn save_about_page(&self, page: &AboutPage) -> RepositoryResult<AboutPage>;
    fn save_settings(&self, settings: &BusinessSettings) -> RepositoryResult<BusinessSettings>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let query = ProductListQuery::new().paginate(usize::MAX, 20);
        let pagination = query.pagination.unwrap();
        assert_eq!(pagination.offset(), i64::MAX);
        assert_eq!(pagination.limit(), 20);

        let first = Pagination {
            page: 0,
            per_page: 20,
        };
        assert_eq!(first.offset(), 0);
        assert_eq!(
            Pagination {
                page: 3,
                per_page: 20
            }
            .offset(),
            40
        );
    }

    #[test]
    fn like_wildcards_in_search_terms_are_escaped() {
        assert_eq!(contains_pattern("taladro"), "%taladro%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
