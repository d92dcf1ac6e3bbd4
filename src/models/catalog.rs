//! Diesel models for categories and products.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::catalog::{
    Category as DomainCategory, NewCategory as DomainNewCategory, Product as DomainProduct,
    ProductDraft,
};
use crate::domain::types::{
    CategoryId, CategoryName, Money, ProductId, ProductName, Sku, Slug, TypeConstraintError,
    WebUrl,
};
use crate::models::parse_stored_decimal;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::categories)]
/// Diesel model for [`crate::domain::catalog::Category`].
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(treat_none_as_null = true)]
/// Insertable and update form of [`Category`].
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Category, foreign_key = category_id))]
#[diesel(table_name = crate::schema::products)]
/// Diesel model for [`crate::domain::catalog::Product`].
pub struct Product {
    pub id: i32,
    pub sku: Option<String>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
/// Insertable form of [`Product`].
pub struct NewProduct<'a> {
    pub sku: Option<&'a str>,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub price: String,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub image_url: Option<&'a str>,
    pub is_published: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Product`] record. The slug stays stable.
pub struct UpdateProduct<'a> {
    pub sku: Option<&'a str>,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: String,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub image_url: Option<&'a str>,
    pub is_published: bool,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::try_from(category.id)?,
            name: CategoryName::new(category.name)?,
            slug: Slug::new(category.slug)?,
            description: category.description,
            created_at: category.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewCategory> for NewCategory<'a> {
    fn from(category: &'a DomainNewCategory) -> Self {
        Self {
            name: category.name.as_str(),
            slug: category.slug.as_str(),
            description: category.description.as_deref(),
        }
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::try_from(product.id)?,
            sku: product.sku.map(Sku::new).transpose()?,
            name: ProductName::new(product.name)?,
            slug: Slug::new(product.slug)?,
            description: product.description,
            price: Money::new(parse_stored_decimal(&product.price)?)?,
            stock: product.stock,
            category_id: product.category_id.map(CategoryId::try_from).transpose()?,
            image_url: product.image_url.map(WebUrl::new).transpose()?,
            is_published: product.is_published,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

impl<'a> NewProduct<'a> {
    pub fn from_draft(draft: &'a ProductDraft, slug: &'a Slug) -> Self {
        Self {
            sku: draft.sku.as_ref().map(Sku::as_str),
            name: draft.name.as_str(),
            slug: slug.as_str(),
            description: draft.description.as_deref(),
            price: draft.price.get().to_string(),
            stock: draft.stock,
            category_id: draft.category_id.map(CategoryId::get),
            image_url: draft.image_url.as_ref().map(WebUrl::as_str),
            is_published: draft.is_published,
        }
    }
}

impl<'a> UpdateProduct<'a> {
    pub fn from_draft(draft: &'a ProductDraft, updated_at: NaiveDateTime) -> Self {
        Self {
            sku: draft.sku.as_ref().map(Sku::as_str),
            name: draft.name.as_str(),
            description: draft.description.as_deref(),
            price: draft.price.get().to_string(),
            stock: draft.stock,
            category_id: draft.category_id.map(CategoryId::get),
            image_url: draft.image_url.as_ref().map(WebUrl::as_str),
            is_published: draft.is_published,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn draft() -> ProductDraft {
        ProductDraft::new(
            Some(Sku::new("SKU-1").unwrap()),
            ProductName::new("Café").unwrap(),
            Some("  ".to_string()),
            Money::parse("1990").unwrap(),
            -5,
            None,
            None,
            true,
        )
    }

    #[test]
    fn new_product_from_draft() {
        let draft = draft();
        let slug = Slug::from_text(draft.name.as_str()).unwrap();
        let new = NewProduct::from_draft(&draft, &slug);
        assert_eq!(new.sku, Some("SKU-1"));
        assert_eq!(new.slug, "cafe");
        assert_eq!(new.description, None);
        assert_eq!(new.price, "1990");
        assert_eq!(new.stock, 0);
    }

    #[test]
    fn product_into_domain() {
        let now = Utc::now().naive_utc();
        let db = Product {
            id: 3,
            sku: None,
            name: "Té verde".to_string(),
            slug: "te-verde".to_string(),
            description: None,
            price: "2500.50".to_string(),
            stock: 4,
            category_id: Some(2),
            image_url: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        let domain = DomainProduct::try_from(db).expect("valid product");
        assert_eq!(domain.price.get(), Decimal::new(250050, 2));
        assert_eq!(domain.category_id.map(CategoryId::get), Some(2));
    }

    #[test]
    fn product_with_corrupt_price_is_rejected() {
        let now = Utc::now().naive_utc();
        let db = Product {
            id: 3,
            sku: None,
            name: "Té".to_string(),
            slug: "te".to_string(),
            description: None,
            price: "abc".to_string(),
            stock: 0,
            category_id: None,
            image_url: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        assert!(DomainProduct::try_from(db).is_err());
    }
}
