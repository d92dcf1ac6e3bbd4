use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Category, CategoryWithCount, Product, ProductListing};
use crate::pagination::Paginated;

/// Query parameters accepted by the back-office product list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<i32>,
    pub page: Option<usize>,
}

/// Data required to render the product list.
pub struct ProductsPageData {
    pub products: Paginated<ProductListing>,
    pub categories: Vec<CategoryWithCount>,
    /// Search query echoed back to the template when present.
    pub search_query: Option<String>,
    pub category_id: Option<i32>,
}

/// Data for the create/edit product form. `product` is `None` when creating.
pub struct ProductFormData {
    pub product: Option<Product>,
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoriesPageData {
    pub categories: Vec<CategoryWithCount>,
}
