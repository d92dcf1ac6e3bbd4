//! Forms for categories and products.

use serde::Deserialize;
use validator::Validate;

use crate::domain::catalog::{NewCategory, ProductDraft};
use crate::domain::types::{CategoryId, CategoryName, Money, ProductName, Sku, Slug, WebUrl};
use crate::forms::{FormError, checkbox, optional_text};

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating or renaming a category.
pub struct CategoryForm {
    /// Display name; the slug is derived from it.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Optional short description shown on the storefront.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl TryFrom<CategoryForm> for NewCategory {
    type Error = FormError;

    fn try_from(form: CategoryForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let description = optional_text(&form.description);
        let name = CategoryName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let slug = Slug::from_text(name.as_str())?;
        Ok(NewCategory::new(name, slug, description))
    }
}

/// Parses an optional `<select>` value holding an id; blank means none.
pub(crate) fn optional_id(value: &Option<String>) -> Result<Option<i32>, FormError> {
    match optional_text(value) {
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| FormError::InvalidId),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating or editing a product.
pub struct ProductForm {
    /// Stock keeping unit; blank when the product has none.
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    /// Product name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Plain text description; line breaks are kept on display.
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// Net unit price in any accepted local format.
    pub price: String,
    /// Units on hand; blank means zero.
    pub stock: Option<String>,
    /// Selected category id, blank for uncategorised.
    pub category_id: Option<String>,
    /// Absolute URL of the product image.
    pub image_url: Option<String>,
    /// Checkbox value, present when the product is published.
    pub is_published: Option<String>,
}

fn parse_stock(value: &Option<String>) -> Result<i32, FormError> {
    match optional_text(value) {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| FormError::Constraint(format!("Stock inválido: {raw}"))),
        None => Ok(0),
    }
}

impl TryFrom<ProductForm> for ProductDraft {
    type Error = FormError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let sku = optional_text(&form.sku).map(Sku::new).transpose()?;
        let name = ProductName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let description = optional_text(&form.description);
        let price = Money::parse(&form.price)?;
        let stock = parse_stock(&form.stock)?;
        let category_id = optional_id(&form.category_id)?
            .map(CategoryId::new)
            .transpose()?;
        let image_url = optional_text(&form.image_url)
            .map(WebUrl::new)
            .transpose()?;

        Ok(ProductDraft::new(
            sku,
            name,
            description,
            price,
            stock,
            category_id,
            image_url,
            checkbox(&form.is_published),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            sku: Some("  ".to_string()),
            name: "Café molido 1kg".to_string(),
            description: Some("Tostado medio & molienda fina".to_string()),
            price: "$ 12.990,50".to_string(),
            stock: Some("".to_string()),
            category_id: Some("3".to_string()),
            image_url: None,
            is_published: Some("on".to_string()),
        }
    }

    #[test]
    fn product_form_becomes_draft() {
        let draft = ProductDraft::try_from(product_form()).unwrap();
        assert_eq!(draft.sku, None);
        assert_eq!(draft.price.get(), Decimal::new(1299050, 2));
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.category_id.map(CategoryId::get), Some(3));
        assert_eq!(
            draft.description.as_deref(),
            Some("Tostado medio & molienda fina")
        );
        assert!(draft.is_published);
    }

    #[test]
    fn unchecked_box_means_unpublished() {
        let mut form = product_form();
        form.is_published = None;
        let draft = ProductDraft::try_from(form).unwrap();
        assert!(!draft.is_published);
    }

    #[test]
    fn bad_price_is_rejected() {
        let mut form = product_form();
        form.price = "gratis".to_string();
        assert!(matches!(
            ProductDraft::try_from(form),
            Err(FormError::InvalidAmount(_))
        ));
    }

    #[test]
    fn category_slug_follows_name() {
        let category = NewCategory::try_from(CategoryForm {
            name: "Artículos de Oficina".to_string(),
            description: None,
        })
        .unwrap();
        assert_eq!(category.slug.as_str(), "articulos-de-oficina");
    }
}
