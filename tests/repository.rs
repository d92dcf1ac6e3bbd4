use chrono::{Duration, Utc};
use cotizador::domain::analytics::AnalyticsEvent;
use cotizador::domain::catalog::{NewCategory, ProductDraft};
use cotizador::domain::content::{AboutPage, BusinessSettings};
use cotizador::domain::crm::{CompanyUpsert, ContactUpsert};
use cotizador::domain::quote::{NewQuote, QuoteCustomer, QuoteItemDraft, QuoteStatus};
use cotizador::domain::types::{
    CategoryId, CategoryName, CompanyName, ContactName, CustomerName, Email, ItemDescription,
    Money, Percentage, ProductName, Quantity, Sku, Slug, UserId, UserName,
};
use cotizador::domain::user::{NewUser, UserRole};
use cotizador::repository::errors::RepositoryError;
use cotizador::repository::{
    AnalyticsReader, AnalyticsWriter, CategoryReader, CategoryWriter, CompanyListQuery,
    CompanyReader, CompanyWriter, ContentReader, ContentWriter, DieselRepository,
    ProductListQuery, ProductReader, ProductWriter, QuoteListQuery, QuoteReader, QuoteWriter,
    UserReader, UserWriter,
};
use rust_decimal::Decimal;

mod common;

fn money(raw: &str) -> Money {
    Money::parse(raw).unwrap()
}

fn draft(sku: Option<&str>, name: &str, price: &str, category_id: Option<CategoryId>) -> ProductDraft {
    ProductDraft::new(
        sku.map(|s| Sku::new(s).unwrap()),
        ProductName::new(name).unwrap(),
        None,
        money(price),
        5,
        category_id,
        None,
        true,
    )
}

fn seller(repo: &DieselRepository) -> UserId {
    repo.create_user(&NewUser::new(
        Email::new("vendedor@example.com").unwrap(),
        UserName::new("Vendedor").unwrap(),
        "hash".to_string(),
        UserRole::Seller,
    ))
    .unwrap()
    .id
}

fn new_quote(created_by: UserId, customer: &str) -> NewQuote {
    let items = vec![
        QuoteItemDraft::try_new(
            None,
            ItemDescription::new("Instalación").unwrap(),
            Quantity::parse("2").unwrap(),
            money("10000"),
            Percentage::ZERO,
        )
        .unwrap(),
        QuoteItemDraft::try_new(
            None,
            ItemDescription::new("Visita técnica").unwrap(),
            Quantity::parse("1").unwrap(),
            money("4000"),
            Percentage::ZERO,
        )
        .unwrap(),
    ];
    NewQuote::try_new(
        QuoteCustomer {
            company_id: None,
            contact_id: None,
            name: CustomerName::new(customer).unwrap(),
            email: None,
            phone: None,
        },
        None,
        Percentage::ZERO,
        Percentage::new(Decimal::from(19)).unwrap(),
        items,
        Utc::now().date_naive() + Duration::days(15),
        created_by,
    )
    .unwrap()
}

#[test]
fn test_user_repository() {
    let test_db = common::TestDb::new("test_user_repository.db");
    let repo = DieselRepository::new(test_db.pool());

    let id = seller(&repo);
    let email = Email::new("VENDEDOR@example.com").unwrap();
    let user = repo.get_user_by_email(&email).unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.role, UserRole::Seller);
    assert!(user.is_active);

    let user = repo.set_user_active(id, false).unwrap();
    assert!(!user.is_active);

    repo.set_user_password(id, "new-hash").unwrap();
    let user = repo.get_user_by_id(id).unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");
    assert_eq!(repo.list_users().unwrap().len(), 1);
}

#[test]
fn test_catalog_repository() {
    let test_db = common::TestDb::new("test_catalog_repository.db");
    let repo = DieselRepository::new(test_db.pool());

    let name = CategoryName::new("Herramientas Eléctricas").unwrap();
    let slug = Slug::from_text(name.as_str()).unwrap();
    let category = repo
        .create_category(&NewCategory::new(name, slug.clone(), None))
        .unwrap();
    assert_eq!(category.slug.as_str(), "herramientas-electricas");
    assert_eq!(
        repo.get_category_by_slug(&slug).unwrap().unwrap().id,
        category.id
    );

    let first = repo
        .create_product(&draft(None, "Taladro", "59990", Some(category.id)))
        .unwrap();
    let second = repo
        .create_product(&draft(None, "Taladro", "69990", Some(category.id)))
        .unwrap();
    assert_eq!(first.slug.as_str(), "taladro");
    assert_eq!(second.slug.as_str(), "taladro-2");

    let counts = repo.list_categories().unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].products, 2);

    // Same SKU updates the existing row.
    let created = repo
        .upsert_product_by_sku(&draft(Some("SRR-1"), "Sierra", "1000", None))
        .unwrap();
    let updated = repo
        .upsert_product_by_sku(&draft(Some("SRR-1"), "Sierra circular", "1500", None))
        .unwrap();
    assert_eq!(created.id, updated.id);
    assert_eq!(updated.name.as_str(), "Sierra circular");
    assert_eq!(updated.price.get(), Decimal::from(1500));

    let (total, found) = repo
        .list_products(ProductListQuery::new().search("circular"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, updated.id);

    let (total, _) = repo
        .list_products(ProductListQuery::new().category(category.id))
        .unwrap();
    assert_eq!(total, 2);

    let ids = [first.id, updated.id];
    assert_eq!(repo.get_products_by_ids(&ids).unwrap().len(), 2);

    // Deleting a category leaves its products uncategorized.
    repo.delete_category(category.id).unwrap();
    let product = repo.get_product_by_id(first.id).unwrap().unwrap();
    assert_eq!(product.category_id, None);

    repo.delete_product(first.id).unwrap();
    assert!(matches!(
        repo.delete_product(first.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_product_search_matches_wildcards_literally() {
    let test_db = common::TestDb::new("test_product_search_wildcards.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&draft(Some("PROMO_50"), "Descuento 50%", "1000", None))
        .unwrap();
    repo.create_product(&draft(Some("PROMO-500"), "Pack 500 tornillos", "2000", None))
        .unwrap();

    let (total, found) = repo
        .list_products(ProductListQuery::new().search("50%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].name.as_str(), "Descuento 50%");

    let (total, found) = repo
        .list_products(ProductListQuery::new().search("O_5"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].sku.as_ref().map(Sku::as_str), Some("PROMO_50"));
}

#[test]
fn test_get_or_create_category_is_idempotent() {
    let test_db = common::TestDb::new("test_get_or_create_category.db");
    let repo = DieselRepository::new(test_db.pool());

    let name = CategoryName::new("Jardín").unwrap();
    let slug = Slug::from_text(name.as_str()).unwrap();
    let new_category = NewCategory::new(name, slug, None);

    let first = repo.get_or_create_category(&new_category).unwrap();
    let second = repo.get_or_create_category(&new_category).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(repo.list_categories().unwrap().len(), 1);
}

#[test]
fn test_crm_upserts_merge_known_fields() {
    let test_db = common::TestDb::new("test_crm_upserts.db");
    let repo = DieselRepository::new(test_db.pool());

    let company = repo
        .upsert_company(&CompanyUpsert::new(
            CompanyName::new("Constructora Ñuble").unwrap(),
            Some("76.123.456-7".to_string()),
            None,
            Some("+56 9 1234 5678".to_string()),
            None,
        ))
        .unwrap();

    // Name differs only in case and accents; missing fields keep stored values.
    let merged = repo
        .upsert_company(&CompanyUpsert::new(
            CompanyName::new("CONSTRUCTORA ñuble").unwrap(),
            None,
            Some(Email::new("ventas@nuble.cl").unwrap()),
            None,
            None,
        ))
        .unwrap();
    assert_eq!(merged.id, company.id);
    assert_eq!(merged.tax_id.as_deref(), Some("76.123.456-7"));
    assert_eq!(merged.phone.as_deref(), Some("+56 9 1234 5678"));
    assert_eq!(merged.email.unwrap().as_str(), "ventas@nuble.cl");

    let contact = repo
        .upsert_contact(&ContactUpsert::new(
            Some(company.id),
            ContactName::new("Ana Pérez").unwrap(),
            Some(Email::new("ana@nuble.cl").unwrap()),
            None,
            Some("Compras".to_string()),
        ))
        .unwrap();
    let same = repo
        .upsert_contact(&ContactUpsert::new(
            None,
            ContactName::new("Ana Pérez Soto").unwrap(),
            Some(Email::new("ANA@nuble.cl").unwrap()),
            Some("2 2345 6789".to_string()),
            None,
        ))
        .unwrap();
    assert_eq!(same.id, contact.id);
    assert_eq!(same.company_id, Some(company.id));
    assert_eq!(same.name.as_str(), "Ana Pérez Soto");
    assert_eq!(same.position.as_deref(), Some("Compras"));

    let (total, _) = repo
        .list_companies(CompanyListQuery::new().search("Constructora"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(repo.list_company_contacts(company.id).unwrap().len(), 1);

    // Contacts outlive their company.
    repo.delete_company(company.id).unwrap();
    let orphan = repo.get_contact_by_id(contact.id).unwrap().unwrap();
    assert_eq!(orphan.company_id, None);
}

#[test]
fn test_quotes_are_numbered_in_sequence() {
    let test_db = common::TestDb::new("test_quotes_are_numbered.db");
    let repo = DieselRepository::new(test_db.pool());
    let user_id = seller(&repo);

    let first = repo
        .create_quote(&new_quote(user_id, "Ferretería Sur"), "COT")
        .unwrap();
    let second = repo
        .create_quote(&new_quote(user_id, "Maderas del Norte"), "COT")
        .unwrap();
    assert_eq!(first.number, "COT-00001");
    assert_eq!(second.number, "COT-00002");
    assert_eq!(first.status, QuoteStatus::Draft);
    assert_eq!(first.totals.subtotal, Decimal::from(24000));
    assert_eq!(first.totals.iva_amount, Decimal::from(4560));
    assert_eq!(first.totals.total, Decimal::from(28560));

    let stored = repo.get_quote_by_id(first.id).unwrap().unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.items[0].position, 1);
    assert_eq!(stored.items[0].description.as_str(), "Instalación");
    assert_eq!(stored.items[0].line_total, Decimal::from(20000));

    // Newest first.
    let (total, listed) = repo.list_quotes(QuoteListQuery::new()).unwrap();
    assert_eq!(total, 2);
    assert_eq!(listed[0].id, second.id);

    let sent = repo.update_quote_status(first.id, QuoteStatus::Sent).unwrap();
    assert_eq!(sent.status, QuoteStatus::Sent);
    let (total, _) = repo
        .list_quotes(QuoteListQuery::new().status(QuoteStatus::Sent))
        .unwrap();
    assert_eq!(total, 1);

    let mut by_status = repo.count_quotes_by_status().unwrap();
    by_status.sort_by_key(|(status, _)| status.as_str());
    assert_eq!(
        by_status,
        vec![(QuoteStatus::Draft, 1), (QuoteStatus::Sent, 1)]
    );

    // A deleted number is never reused.
    repo.delete_quote(second.id).unwrap();
    assert!(repo.get_quote_by_id(second.id).unwrap().is_none());
    let third = repo
        .create_quote(&new_quote(user_id, "Vidrios Austral"), "COT")
        .unwrap();
    assert_eq!(third.number, "COT-00003");
}

#[test]
fn test_counters() {
    let test_db = common::TestDb::new("test_counters.db");
    let repo = DieselRepository::new(test_db.pool());

    let product = repo
        .create_product(&draft(None, "Martillo", "7990", None))
        .unwrap();
    let view = AnalyticsEvent::ProductView(product.id).counter_key();
    let storefront = AnalyticsEvent::StorefrontView.counter_key();

    repo.increment_counter(&storefront).unwrap();
    repo.increment_counter(&storefront).unwrap();
    repo.increment_counter(&view).unwrap();

    let counters = repo.list_counters(&AnalyticsEvent::global_keys()).unwrap();
    assert_eq!(counters.len(), AnalyticsEvent::global_keys().len());
    let storefront_count = counters
        .iter()
        .find(|counter| counter.key == storefront)
        .unwrap();
    assert_eq!(storefront_count.count, 2);
    assert!(
        counters
            .iter()
            .filter(|counter| counter.key != storefront)
            .all(|counter| counter.count == 0)
    );

    let top = repo.top_product_views(5).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].product.id, product.id);
    assert_eq!(top[0].views, 1);
}

#[test]
fn test_top_product_views_ignore_deleted_products() {
    let test_db = common::TestDb::new("test_top_product_views.db");
    let repo = DieselRepository::new(test_db.pool());

    let gone = repo
        .create_product(&draft(None, "Serrucho", "9990", None))
        .unwrap();
    let live = repo
        .create_product(&draft(None, "Alicate", "4990", None))
        .unwrap();
    let gone_key = AnalyticsEvent::ProductView(gone.id).counter_key();
    for _ in 0..3 {
        repo.increment_counter(&gone_key).unwrap();
    }
    repo.increment_counter(&AnalyticsEvent::ProductView(live.id).counter_key())
        .unwrap();
    // Counter of a product removed before its row was cleaned up.
    for _ in 0..5 {
        repo.increment_counter("product_view:999").unwrap();
    }

    repo.delete_product(gone.id).unwrap();
    assert_eq!(repo.list_counters(&[gone_key]).unwrap()[0].count, 0);

    let top = repo.top_product_views(1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].product.id, live.id);
    assert_eq!(top[0].views, 1);
}

#[test]
fn test_content_singletons() {
    let test_db = common::TestDb::new("test_content_singletons.db");
    let repo = DieselRepository::new(test_db.pool());

    assert!(repo.get_settings().unwrap().is_none());
    assert!(repo.get_about_page().unwrap().is_none());

    let settings = BusinessSettings {
        company_name: "Ferretería Los Andes".to_string(),
        quote_prefix: "FLA".to_string(),
        ..BusinessSettings::default()
    };
    repo.save_settings(&settings).unwrap();
    let changed = BusinessSettings {
        quote_validity_days: 30,
        ..settings
    };
    repo.save_settings(&changed).unwrap();
    assert_eq!(repo.get_settings().unwrap().unwrap(), changed);

    let page = AboutPage::new("Quiénes somos", "<p>Desde 1998.</p><script>alert(1)</script>");
    repo.save_about_page(&page).unwrap();
    let stored = repo.get_about_page().unwrap().unwrap();
    assert_eq!(stored.title, "Quiénes somos");
    assert_eq!(stored.body, "<p>Desde 1998.</p>");
}
