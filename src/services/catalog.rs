//! Back-office management of categories and products.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::catalog::{
    Category, CategoryWithCount, NewCategory, Product, ProductDraft, ProductListing,
};
use crate::domain::types::{CategoryId, ProductId};
use crate::domain::user::{ADMIN_ROLE, SELLER_ROLE};
use crate::dto::catalog::{CategoriesPageData, ProductFormData, ProductsPageData, ProductsQuery};
use crate::forms::catalog::{CategoryForm, ProductForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CategoryReader, CategoryWriter, ProductListQuery, ProductReader, ProductWriter,
};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Trims a free-text filter and drops it when blank.
pub(crate) fn search_term(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Joins products with their category for display.
pub(crate) fn with_categories(
    products: Vec<Product>,
    categories: &[CategoryWithCount],
) -> Vec<ProductListing> {
    products
        .into_iter()
        .map(|product| {
            let category = product.category_id.and_then(|id| {
                categories
                    .iter()
                    .find(|c| c.category.id == id)
                    .map(|c| c.category.clone())
            });
            ProductListing { product, category }
        })
        .collect()
}

fn ensure_category_exists<R>(repo: &R, draft: &ProductDraft) -> ServiceResult<()>
where
    R: CategoryReader + ?Sized,
{
    if let Some(category_id) = draft.category_id
        && repo.get_category_by_id(category_id)?.is_none()
    {
        return Err(ServiceError::Form("La categoría no existe".to_string()));
    }
    Ok(())
}

fn sku_conflict(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => {
            ServiceError::Form("Ya existe un producto con ese SKU".to_string())
        }
        other => other,
    }
}

fn slug_conflict(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => {
            ServiceError::Form("Ya existe una categoría con ese nombre".to_string())
        }
        other => other,
    }
}

/// Loads the paginated product list with optional search and category filter.
pub fn list_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ProductsQuery,
) -> ServiceResult<ProductsPageData>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let page = query.page.unwrap_or(1);
    let mut list_query = ProductListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let search_query = search_term(query.search);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let category_id = query.category.map(CategoryId::new).transpose()?;
    if let Some(category_id) = category_id {
        list_query = list_query.category(category_id);
    }

    let (total, products) = repo.list_products(list_query).map_err(|err| {
        log::error!("Failed to list products: {err}");
        err
    })?;
    let categories = repo.list_categories()?;

    Ok(ProductsPageData {
        products: Paginated::from_total(
            with_categories(products, &categories),
            page,
            total,
            DEFAULT_ITEMS_PER_PAGE,
        ),
        categories,
        search_query,
        category_id: category_id.map(CategoryId::get),
    })
}

/// Loads what the product form needs; `product_id` is `None` for a new product.
pub fn load_product_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: Option<i32>,
) -> ServiceResult<ProductFormData>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let product = match product_id {
        Some(id) => Some(
            repo.get_product_by_id(ProductId::new(id)?)?
                .ok_or(ServiceError::NotFound)?,
        ),
        None => None,
    };

    let categories = repo
        .list_categories()?
        .into_iter()
        .map(|c| c.category)
        .collect();

    Ok(ProductFormData {
        product,
        categories,
    })
}

pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + CategoryReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let draft = ProductDraft::try_from(form)?;
    ensure_category_exists(repo, &draft)?;

    repo.create_product(&draft)
        .map_err(|err| {
            log::error!("Failed to create product: {err}");
            sku_conflict(err.into())
        })
}

pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let product_id = ProductId::new(product_id)?;
    let draft = ProductDraft::try_from(form)?;

    repo.get_product_by_id(product_id)?
        .ok_or(ServiceError::NotFound)?;
    ensure_category_exists(repo, &draft)?;

    repo.update_product(product_id, &draft).map_err(|err| {
        log::error!("Failed to update product {product_id}: {err}");
        sku_conflict(err.into())
    })
}

pub fn delete_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let product_id = ProductId::new(product_id)?;
    repo.delete_product(product_id).map_err(|err| {
        log::error!("Failed to delete product {product_id}: {err}");
        err
    })?;

    Ok(())
}

pub fn list_categories<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CategoriesPageData>
where
    R: CategoryReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let categories = repo.list_categories().map_err(|err| {
        log::error!("Failed to list categories: {err}");
        err
    })?;

    Ok(CategoriesPageData { categories })
}

pub fn create_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let new_category = NewCategory::try_from(form)?;

    if repo.get_category_by_slug(&new_category.slug)?.is_some() {
        return Err(slug_conflict(ServiceError::Conflict(
            new_category.slug.into_inner(),
        )));
    }

    repo.create_category(&new_category).map_err(|err| {
        log::error!("Failed to create category: {err}");
        slug_conflict(err.into())
    })
}

pub fn update_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    category_id: i32,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let category_id = CategoryId::new(category_id)?;
    let updates = NewCategory::try_from(form)?;

    repo.get_category_by_id(category_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(other) = repo.get_category_by_slug(&updates.slug)?
        && other.id != category_id
    {
        return Err(slug_conflict(ServiceError::Conflict(other.slug.into_inner())));
    }

    repo.update_category(category_id, &updates).map_err(|err| {
        log::error!("Failed to update category {category_id}: {err}");
        slug_conflict(err.into())
    })
}

/// Deletes a category; its products stay in the catalog uncategorised.
pub fn delete_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    category_id: i32,
) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let category_id = CategoryId::new(category_id)?;
    repo.delete_category(category_id).map_err(|err| {
        log::error!("Failed to delete category {category_id}: {err}");
        err
    })?;

    Ok(())
}
