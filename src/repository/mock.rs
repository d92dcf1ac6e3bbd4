//! Mock repository implementations for isolating services in tests.

use mockall::mock;

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
use crate::repository::{
    AnalyticsReader, AnalyticsWriter, CategoryReader, CategoryWriter, CompanyListQuery,
    CompanyReader, CompanyWriter, ContentReader, ContentWriter, ProductListQuery, ProductReader,
    ProductWriter, QuoteListQuery, QuoteReader, QuoteWriter, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
        fn list_users(&self) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn set_user_active(&self, id: UserId, is_active: bool) -> RepositoryResult<User>;
        fn set_user_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()>;
    }

    impl CategoryReader for Repository {
        fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
        fn get_category_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Category>>;
        fn list_categories(&self) -> RepositoryResult<Vec<CategoryWithCount>>;
    }

    impl CategoryWriter for Repository {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(
            &self,
            id: CategoryId,
            updates: &NewCategory,
        ) -> RepositoryResult<Category>;
        fn delete_category(&self, id: CategoryId) -> RepositoryResult<()>;
        fn get_or_create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    }

    impl ProductReader for Repository {
        fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
        fn get_product_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Product>>;
        fn get_products_by_ids(&self, ids: &[ProductId]) -> RepositoryResult<Vec<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    }

    impl ProductWriter for Repository {
        fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product>;
        fn update_product(&self, id: ProductId, draft: &ProductDraft) -> RepositoryResult<Product>;
        fn delete_product(&self, id: ProductId) -> RepositoryResult<()>;
        fn upsert_product_by_sku(&self, draft: &ProductDraft) -> RepositoryResult<Product>;
    }

    impl CompanyReader for Repository {
        fn get_company_by_id(&self, id: CompanyId) -> RepositoryResult<Option<Company>>;
        fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)>;
        fn get_contact_by_id(&self, id: ContactId) -> RepositoryResult<Option<Contact>>;
        fn list_company_contacts(&self, company_id: CompanyId) -> RepositoryResult<Vec<Contact>>;
    }

    impl CompanyWriter for Repository {
        fn upsert_company(&self, company: &CompanyUpsert) -> RepositoryResult<Company>;
        fn delete_company(&self, id: CompanyId) -> RepositoryResult<()>;
        fn upsert_contact(&self, contact: &ContactUpsert) -> RepositoryResult<Contact>;
        fn update_contact(&self, id: ContactId, contact: &ContactUpsert) -> RepositoryResult<Contact>;
        fn delete_contact(&self, id: ContactId) -> RepositoryResult<()>;
    }

    impl QuoteReader for Repository {
        fn get_quote_by_id(&self, id: QuoteId) -> RepositoryResult<Option<QuoteWithItems>>;
        fn list_quotes(&self, query: QuoteListQuery) -> RepositoryResult<(usize, Vec<Quote>)>;
        fn count_quotes_by_status(&self) -> RepositoryResult<Vec<(QuoteStatus, i64)>>;
    }

    impl QuoteWriter for Repository {
        fn create_quote(&self, new_quote: &NewQuote, prefix: &str) -> RepositoryResult<Quote>;
        fn update_quote_status(&self, id: QuoteId, status: QuoteStatus) -> RepositoryResult<Quote>;
        fn delete_quote(&self, id: QuoteId) -> RepositoryResult<()>;
    }

    impl AnalyticsReader for Repository {
        fn list_counters(&self, keys: &[String]) -> RepositoryResult<Vec<Counter>>;
        fn top_product_views(&self, limit: usize) -> RepositoryResult<Vec<ProductViews>>;
    }

    impl AnalyticsWriter for Repository {
        fn increment_counter(&self, key: &str) -> RepositoryResult<()>;
    }

    impl ContentReader for Repository {
        fn get_about_page(&self) -> RepositoryResult<Option<AboutPage>>;
        fn get_settings(&self) -> RepositoryResult<Option<BusinessSettings>>;
    }

    impl ContentWriter for Repository {
        fn save_about_page(&self, page: &AboutPage) -> RepositoryResult<AboutPage>;
        fn save_settings(&self, settings: &BusinessSettings) -> RepositoryResult<BusinessSettings>;
    }
}
