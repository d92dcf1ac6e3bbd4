//! Catalog aggregates: categories and products.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    CategoryId, CategoryName, Money, ProductId, ProductName, Sku, Slug, WebUrl,
};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub slug: Slug,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub slug: Slug,
    pub description: Option<String>,
}

impl NewCategory {
    #[must_use]
    pub fn new(name: CategoryName, slug: Slug, description: Option<String>) -> Self {
        Self {
            name,
            slug,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Category with the number of products filed under it.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryWithCount {
    pub category: Category,
    pub products: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub sku: Option<Sku>,
    pub name: ProductName,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<WebUrl>,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Values used both when creating and updating a product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub sku: Option<Sku>,
    pub name: ProductName,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<WebUrl>,
    pub is_published: bool,
}

impl ProductDraft {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sku: Option<Sku>,
        name: ProductName,
        description: Option<String>,
        price: Money,
        stock: i32,
        category_id: Option<CategoryId>,
        image_url: Option<WebUrl>,
        is_published: bool,
    ) -> Self {
        Self {
            sku,
            name,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            price,
            stock: stock.max(0),
            category_id,
            image_url,
            is_published,
        }
    }
}

/// Product joined with its category name for listings.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProductListing {
    pub product: Product,
    pub category: Option<Category>,
}
