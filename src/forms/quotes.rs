//! Forms for creating quotations and changing their status.
//!
//! The quote form posts one value per item row for every `item_*` key, so it
//! is decoded from the raw body with `serde_html_form`, which collects
//! repeated keys into vectors.

use serde::Deserialize;
use validator::Validate;

use crate::domain::quote::QuoteStatus;
use crate::domain::types::{
    CompanyName, ContactName, Email, Money, Percentage, ProductId, Quantity,
};
use crate::forms::{FormError, optional_text};

#[derive(Debug, Default, Deserialize, Validate)]
/// Quote request as posted by the back-office form.
pub struct QuoteForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Free text printed under the totals.
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    /// Discount over the whole quote, in percent.
    #[serde(default)]
    pub discount_percent: Option<String>,
    /// Item columns; index `n` of every vector belongs to row `n`.
    #[serde(default)]
    pub item_product_id: Vec<String>,
    #[serde(default)]
    pub item_description: Vec<String>,
    #[serde(default)]
    pub item_quantity: Vec<String>,
    #[serde(default)]
    pub item_unit_price: Vec<String>,
    #[serde(default)]
    pub item_discount: Vec<String>,
}

impl QuoteForm {
    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn from_bytes(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|e| FormError::Malformed(e.to_string()))
    }
}

/// One item row as entered; product defaults are applied by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLineInput {
    pub product_id: Option<ProductId>,
    pub description: Option<String>,
    pub quantity: Quantity,
    pub unit_price: Option<Money>,
    pub discount_percent: Percentage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotePayload {
    pub company_name: Option<CompanyName>,
    pub tax_id: Option<String>,
    pub contact_name: Option<ContactName>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub discount_percent: Percentage,
    pub lines: Vec<QuoteLineInput>,
}

fn column(values: &[String], row: usize) -> Option<String> {
    values
        .get(row)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_line(form: &QuoteForm, row: usize) -> Result<Option<QuoteLineInput>, FormError> {
    let item_error = |message: String| FormError::InvalidItem(row + 1, message);

    let product_id = column(&form.item_product_id, row)
        .map(|raw| {
            raw.parse::<i32>()
                .ok()
                .and_then(|id| ProductId::new(id).ok())
                .ok_or_else(|| item_error("producto inválido".to_string()))
        })
        .transpose()?;
    let description = column(&form.item_description, row);

    if product_id.is_none() && description.is_none() {
        return Ok(None);
    }

    let quantity = match column(&form.item_quantity, row) {
        Some(raw) => Quantity::parse(&raw).map_err(|e| item_error(e.to_string()))?,
        None => Quantity::parse("1").map_err(|e| item_error(e.to_string()))?,
    };
    let unit_price = column(&form.item_unit_price, row)
        .map(|raw| Money::parse(&raw))
        .transpose()
        .map_err(|e| item_error(e.to_string()))?;
    let discount_percent = Percentage::parse(
        column(&form.item_discount, row)
            .as_deref()
            .unwrap_or_default(),
    )
    .map_err(|e| item_error(e.to_string()))?;

    Ok(Some(QuoteLineInput {
        product_id,
        description,
        quantity,
        unit_price,
        discount_percent,
    }))
}

impl TryFrom<QuoteForm> for QuotePayload {
    type Error = FormError;

    fn try_from(form: QuoteForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let rows = [
            form.item_product_id.len(),
            form.item_description.len(),
            form.item_quantity.len(),
            form.item_unit_price.len(),
            form.item_discount.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        let mut lines = Vec::new();
        for row in 0..rows {
            if let Some(line) = parse_line(&form, row)? {
                lines.push(line);
            }
        }
        if lines.is_empty() {
            return Err(FormError::NoItems);
        }

        let company_name = optional_text(&form.company_name)
            .map(CompanyName::new)
            .transpose()?;
        let contact_name = optional_text(&form.contact_name)
            .map(ContactName::new)
            .transpose()?;
        let email = optional_text(&form.email)
            .map(Email::new)
            .transpose()
            .map_err(|_| FormError::InvalidEmail)?;

        if company_name.is_none() && contact_name.is_none() && email.is_none() {
            return Err(FormError::Constraint(
                "Indique la empresa, el contacto o el correo del cliente".to_string(),
            ));
        }

        let discount_percent = Percentage::parse(
            optional_text(&form.discount_percent)
                .as_deref()
                .unwrap_or_default(),
        )?;

        Ok(Self {
            company_name,
            tax_id: optional_text(&form.tax_id),
            contact_name,
            email,
            phone: optional_text(&form.phone),
            notes: optional_text(&form.notes),
            discount_percent,
            lines,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteStatusForm {
    pub status: String,
}

impl TryFrom<QuoteStatusForm> for QuoteStatus {
    type Error = FormError;

    fn try_from(form: QuoteStatusForm) -> Result<Self, Self::Error> {
        QuoteStatus::try_from(form.status.as_str()).map_err(|_| FormError::InvalidStatus)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn repeated_keys_become_rows() {
        let body = "company_name=Ferreter%C3%ADa+El+Sol&discount_percent=5\
            &item_product_id=&item_description=Martillo&item_quantity=2&item_unit_price=5.000&item_discount=\
            &item_product_id=&item_description=&item_quantity=&item_unit_price=&item_discount=\
            &item_product_id=7&item_description=&item_quantity=3&item_unit_price=&item_discount=10";
        let form = QuoteForm::from_bytes(body.as_bytes()).unwrap();
        let payload = QuotePayload::try_from(form).unwrap();

        assert_eq!(payload.lines.len(), 2);
        assert_eq!(
            payload.company_name.as_ref().map(CompanyName::as_str),
            Some("Ferretería El Sol")
        );
        assert_eq!(payload.discount_percent.get(), Decimal::new(5, 0));

        let first = &payload.lines[0];
        assert_eq!(first.description.as_deref(), Some("Martillo"));
        assert_eq!(first.unit_price.map(Money::get), Some(Decimal::new(5, 0)));

        let second = &payload.lines[1];
        assert_eq!(second.product_id.map(ProductId::get), Some(7));
        assert_eq!(second.unit_price, None);
        assert_eq!(second.discount_percent.get(), Decimal::new(10, 0));
    }

    #[test]
    fn empty_rows_only_is_an_error() {
        let form = QuoteForm {
            company_name: Some("ACME".to_string()),
            item_description: vec!["  ".to_string()],
            ..QuoteForm::default()
        };
        assert!(matches!(
            QuotePayload::try_from(form),
            Err(FormError::NoItems)
        ));
    }

    #[test]
    fn customer_is_required() {
        let form = QuoteForm {
            item_description: vec!["Servicio".to_string()],
            ..QuoteForm::default()
        };
        assert!(matches!(
            QuotePayload::try_from(form),
            Err(FormError::Constraint(_))
        ));
    }

    #[test]
    fn ampersands_stay_plain_text_up_to_the_pdf() {
        let body = "company_name=P%C3%A9rez+%26+Hijos&notes=Entrega+%3C48h%3E\
            &item_description=Tubo+%26+codo&item_quantity=1&item_unit_price=100";
        let payload = QuotePayload::try_from(QuoteForm::from_bytes(body.as_bytes()).unwrap()).unwrap();

        let company = payload.company_name.as_ref().map(CompanyName::as_str);
        assert_eq!(company, Some("Pérez & Hijos"));
        assert_eq!(payload.lines[0].description.as_deref(), Some("Tubo & codo"));
        assert_eq!(payload.notes.as_deref(), Some("Entrega <48h>"));
        assert_eq!(crate::pdf::pdf_text(company.unwrap()), "Perez & Hijos");
    }

    #[test]
    fn email_alone_identifies_the_customer() {
        let form = QuoteForm {
            email: Some("compras@obra.cl".to_string()),
            item_description: vec!["Visita".to_string()],
            ..QuoteForm::default()
        };
        let payload = QuotePayload::try_from(form).unwrap();
        assert!(payload.company_name.is_none() && payload.contact_name.is_none());
        assert_eq!(payload.email.as_ref().map(Email::as_str), Some("compras@obra.cl"));
    }

    #[test]
    fn oversized_quantity_is_a_row_error() {
        let form = QuoteForm {
            contact_name: Some("Ana".to_string()),
            item_description: vec!["A".to_string()],
            item_quantity: vec!["9999999999999999999999".to_string()],
            item_unit_price: vec!["99999999999999".to_string()],
            ..QuoteForm::default()
        };
        assert!(matches!(
            QuotePayload::try_from(form),
            Err(FormError::InvalidItem(1, _))
        ));
    }

    #[test]
    fn overlong_notes_fail_validation() {
        let form = QuoteForm {
            contact_name: Some("Ana".to_string()),
            notes: Some("x".repeat(4001)),
            item_description: vec!["A".to_string()],
            ..QuoteForm::default()
        };
        assert!(matches!(
            QuotePayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn bad_quantity_reports_row_number() {
        let form = QuoteForm {
            contact_name: Some("Ana".to_string()),
            item_description: vec!["A".to_string(), "B".to_string()],
            item_quantity: vec!["1".to_string(), "0".to_string()],
            ..QuoteForm::default()
        };
        assert!(matches!(
            QuotePayload::try_from(form),
            Err(FormError::InvalidItem(2, _))
        ));
    }

    #[test]
    fn status_form_parses_known_values() {
        let status = QuoteStatus::try_from(QuoteStatusForm {
            status: "sent".to_string(),
        })
        .unwrap();
        assert_eq!(status, QuoteStatus::Sent);
        assert!(
            QuoteStatus::try_from(QuoteStatusForm {
                status: "archived".to_string()
            })
            .is_err()
        );
    }
}
