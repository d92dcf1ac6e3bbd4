//! Public catalog pages and the JSON product listing.

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::catalog::{Category, CategoryWithCount, Product};
use crate::domain::types::Slug;
use crate::dto::storefront::{
    ApiProduct, ApiProductsPage, CatalogPageData, CatalogQuery, ProductPageData,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{AnalyticsWriter, CategoryReader, ProductListQuery, ProductReader};
use crate::services::analytics::record;
use crate::services::catalog::search_term;
use crate::services::{ServiceError, ServiceResult};

/// Largest page size accepted by the JSON listing.
pub const MAX_API_PER_PAGE: usize = 100;

/// Resolves the category filter; an unknown slug is a 404.
fn find_category<R>(repo: &R, slug: Option<String>) -> ServiceResult<Option<Category>>
where
    R: CategoryReader + ?Sized,
{
    let Some(raw) = search_term(slug) else {
        return Ok(None);
    };
    let slug = Slug::new(raw).map_err(|_| ServiceError::NotFound)?;
    repo.get_category_by_slug(&slug)?
        .map(Some)
        .ok_or(ServiceError::NotFound)
}

fn published_query(
    search: Option<String>,
    category: Option<&Category>,
    page: usize,
    per_page: usize,
) -> ProductListQuery {
    let mut query = ProductListQuery::new().published().paginate(page, per_page);
    if let Some(term) = search {
        query = query.search(term);
    }
    if let Some(category) = category {
        query = query.category(category.id);
    }
    query
}

/// Loads a page of published products for the public catalog.
pub fn load_catalog<R>(repo: &R, query: CatalogQuery) -> ServiceResult<CatalogPageData>
where
    R: ProductReader + CategoryReader + AnalyticsWriter + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let search_query = search_term(query.search);
    let current_category = find_category(repo, query.category)?;

    let (total, products) = repo
        .list_products(published_query(
            search_query.clone(),
            current_category.as_ref(),
            page,
            DEFAULT_ITEMS_PER_PAGE,
        ))
        .map_err(|err| {
            log::error!("Failed to list catalog products: {err}");
            err
        })?;
    let categories: Vec<CategoryWithCount> = repo.list_categories()?;

    record(repo, AnalyticsEvent::StorefrontView);
    if let Some(category) = &current_category {
        record(repo, AnalyticsEvent::CategoryView(category.id));
    }

    Ok(CatalogPageData {
        products: Paginated::from_total(products, page, total, DEFAULT_ITEMS_PER_PAGE),
        categories,
        current_category,
        search_query,
    })
}

/// Loads a published product by slug. Unpublished products are not found.
pub fn load_product<R>(repo: &R, slug: &str) -> ServiceResult<ProductPageData>
where
    R: ProductReader + CategoryReader + AnalyticsWriter + ?Sized,
{
    let slug = Slug::new(slug).map_err(|_| ServiceError::NotFound)?;
    let product = repo
        .get_product_by_slug(&slug)?
        .filter(|product| product.is_published)
        .ok_or(ServiceError::NotFound)?;

    let category = match product.category_id {
        Some(id) => repo.get_category_by_id(id)?,
        None => None,
    };

    record(repo, AnalyticsEvent::ProductView(product.id));

    Ok(ProductPageData { product, category })
}

fn to_api_product(product: Product, categories: &[CategoryWithCount]) -> ApiProduct {
    let category = product.category_id.and_then(|id| {
        categories
            .iter()
            .find(|c| c.category.id == id)
            .map(|c| c.category.name.as_str().to_string())
    });
    ApiProduct {
        id: product.id.get(),
        sku: product.sku.map(|sku| sku.into_inner()),
        name: product.name.into_inner(),
        slug: product.slug.into_inner(),
        description: product.description,
        price: format!("{:.2}", product.price.get()),
        stock: product.stock,
        category,
        image_url: product.image_url.map(|url| url.into_inner()),
    }
}

/// JSON listing of published products with the catalog filters.
pub fn api_products<R>(
    repo: &R,
    query: CatalogQuery,
    per_page: Option<usize>,
) -> ServiceResult<ApiProductsPage>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    let page = query.page.unwrap_or(1).max(1);
    let per_page = per_page
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
        .clamp(1, MAX_API_PER_PAGE);
    let category = find_category(repo, query.category)?;

    let (total, products) = repo.list_products(published_query(
        search_term(query.search),
        category.as_ref(),
        page,
        per_page,
    ))?;
    let categories = repo.list_categories()?;

    Ok(ApiProductsPage {
        total,
        page,
        per_page,
        items: products
            .into_iter()
            .map(|product| to_api_product(product, &categories))
            .collect(),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::CategoryId;
    use crate::repository::mock::MockRepository;
    use crate::services::catalog::tests::{category, product};

    #[test]
    fn catalog_only_lists_published_and_counts_views() {
        let mut repo = MockRepository::new();
        repo.expect_get_category_by_slug()
            .withf(|slug| slug.as_str() == "herramientas")
            .returning(|_| Ok(Some(category(4, "Herramientas"))));
        repo.expect_list_products()
            .withf(|query| query.published_only && query.category_id.map(CategoryId::get) == Some(4))
            .returning(|_| Ok((1, vec![product(1, "Martillo", "5990")])));
        repo.expect_list_categories().returning(|| Ok(vec![]));
        repo.expect_increment_counter()
            .withf(|key| key == "storefront_view")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_increment_counter()
            .withf(|key| key == "category_view:4")
            .times(1)
            .returning(|_| Ok(()));

        let data = load_catalog(
            &repo,
            CatalogQuery {
                search: None,
                category: Some("herramientas".to_string()),
                page: None,
            },
        )
        .unwrap();

        assert_eq!(data.products.items.len(), 1);
        assert_eq!(
            data.current_category.map(|c| c.id.get()),
            Some(4)
        );
    }

    #[test]
    fn unknown_category_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_category_by_slug().returning(|_| Ok(None));
        repo.expect_list_products().times(0);

        let result = load_catalog(
            &repo,
            CatalogQuery {
                category: Some("nada".to_string()),
                ..CatalogQuery::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn unpublished_product_is_hidden() {
        let mut repo = MockRepository::new();
        repo.expect_get_product_by_slug().returning(|_| {
            let mut hidden = product(2, "Prototipo", "100");
            hidden.is_published = false;
            Ok(Some(hidden))
        });
        repo.expect_increment_counter().times(0);

        assert!(matches!(
            load_product(&repo, "prototipo"),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            load_product(&repo, "No Es Slug"),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn product_view_is_recorded() {
        let mut repo = MockRepository::new();
        repo.expect_get_product_by_slug()
            .returning(|_| Ok(Some(product(2, "Martillo", "5990"))));
        repo.expect_increment_counter()
            .withf(|key| key == "product_view:2")
            .times(1)
            .returning(|_| Ok(()));

        let data = load_product(&repo, "martillo").unwrap();
        assert_eq!(data.product.name.as_str(), "Martillo");
        assert!(data.category.is_none());
    }

    #[test]
    fn api_clamps_page_size() {
        let mut repo = MockRepository::new();
        repo.expect_list_products()
            .withf(|query| query.pagination.as_ref().map(|p| p.per_page) == Some(MAX_API_PER_PAGE))
            .returning(|_| Ok((1, vec![product(3, "Clavos", "1.234,5")])));
        repo.expect_list_categories().returning(|| Ok(vec![]));

        let page = api_products(&repo, CatalogQuery::default(), Some(1000)).unwrap();

        assert_eq!(page.per_page, MAX_API_PER_PAGE);
        assert_eq!(page.items[0].price, "1234.50");
        assert_eq!(page.items[0].slug, "clavos");
    }
}
