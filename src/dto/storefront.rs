use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Category, CategoryWithCount, Product};
use crate::pagination::Paginated;

/// Query parameters of the public catalog and its JSON twin.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub page: Option<usize>,
}

pub struct CatalogPageData {
    pub products: Paginated<Product>,
    pub categories: Vec<CategoryWithCount>,
    pub current_category: Option<Category>,
    pub search_query: Option<String>,
}

pub struct ProductPageData {
    pub product: Product,
    pub category: Option<Category>,
}

/// Product as exposed by `GET /api/v1/products`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ApiProduct {
    pub id: i32,
    pub sku: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Decimal rendered as a string to keep its precision.
    pub price: String,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiProductsPage {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub items: Vec<ApiProduct>,
}
