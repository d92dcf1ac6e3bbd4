//! Diesel models for quotations and their line items.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::quote::{
    NewQuote as DomainNewQuote, Quote as DomainQuote, QuoteCustomer, QuoteItem as DomainQuoteItem,
    QuoteItemDraft, QuoteStatus, QuoteTotals,
};
use crate::domain::types::{
    CompanyId, ContactId, CustomerName, Email, ItemDescription, Money, Percentage, ProductId,
    Quantity, QuoteId, TypeConstraintError, UserId,
};
use crate::models::parse_stored_decimal;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::quotes)]
/// Diesel model for [`crate::domain::quote::Quote`].
pub struct Quote {
    pub id: i32,
    pub sequence: i32,
    pub number: String,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub discount_percent: String,
    pub iva_rate: String,
    pub subtotal: String,
    pub discount_amount: String,
    pub net: String,
    pub iva_amount: String,
    pub total: String,
    pub valid_until: NaiveDate,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::quotes)]
/// Insertable form of [`Quote`]; totals are computed from the domain value.
pub struct NewQuote<'a> {
    pub sequence: i32,
    pub number: String,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub customer_name: &'a str,
    pub customer_email: Option<&'a str>,
    pub customer_phone: Option<&'a str>,
    pub status: &'static str,
    pub notes: Option<&'a str>,
    pub discount_percent: String,
    pub iva_rate: String,
    pub subtotal: String,
    pub discount_amount: String,
    pub net: String,
    pub iva_amount: String,
    pub total: String,
    pub valid_until: NaiveDate,
    pub created_by: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Quote, foreign_key = quote_id))]
#[diesel(table_name = crate::schema::quote_items)]
pub struct QuoteItem {
    pub id: i32,
    pub quote_id: i32,
    pub position: i32,
    pub product_id: Option<i32>,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub discount_percent: String,
    pub line_total: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::quote_items)]
pub struct NewQuoteItem<'a> {
    pub quote_id: i32,
    pub position: i32,
    pub product_id: Option<i32>,
    pub description: &'a str,
    pub quantity: String,
    pub unit_price: String,
    pub discount_percent: String,
    pub line_total: String,
}

impl<'a> NewQuote<'a> {
    pub fn from_domain(quote: &'a DomainNewQuote, sequence: i32, number: String) -> Self {
        let totals = quote.totals();
        Self {
            sequence,
            number,
            company_id: quote.customer.company_id.map(CompanyId::get),
            contact_id: quote.customer.contact_id.map(ContactId::get),
            customer_name: quote.customer.name.as_str(),
            customer_email: quote.customer.email.as_ref().map(Email::as_str),
            customer_phone: quote.customer.phone.as_deref(),
            status: QuoteStatus::Draft.as_str(),
            notes: quote.notes.as_deref(),
            discount_percent: quote.discount_percent.get().to_string(),
            iva_rate: quote.iva_rate.get().to_string(),
            subtotal: totals.subtotal.to_string(),
            discount_amount: totals.discount_amount.to_string(),
            net: totals.net.to_string(),
            iva_amount: totals.iva_amount.to_string(),
            total: totals.total.to_string(),
            valid_until: quote.valid_until,
            created_by: quote.created_by.get(),
        }
    }
}

impl<'a> NewQuoteItem<'a> {
    pub fn from_draft(quote_id: i32, position: i32, item: &'a QuoteItemDraft) -> Self {
        Self {
            quote_id,
            position,
            product_id: item.product_id.map(ProductId::get),
            description: item.description.as_str(),
            quantity: item.quantity.get().to_string(),
            unit_price: item.unit_price.get().to_string(),
            discount_percent: item.discount_percent.get().to_string(),
            line_total: item.line_total().to_string(),
        }
    }
}

impl TryFrom<Quote> for DomainQuote {
    type Error = TypeConstraintError;

    fn try_from(quote: Quote) -> Result<Self, Self::Error> {
        Ok(Self {
            id: QuoteId::try_from(quote.id)?,
            sequence: quote.sequence,
            number: quote.number,
            customer: QuoteCustomer {
                company_id: quote.company_id.map(CompanyId::try_from).transpose()?,
                contact_id: quote.contact_id.map(ContactId::try_from).transpose()?,
                name: CustomerName::new(quote.customer_name)?,
                email: quote.customer_email.map(Email::new).transpose()?,
                phone: quote.customer_phone,
            },
            status: QuoteStatus::try_from(quote.status.as_str())?,
            notes: quote.notes,
            discount_percent: Percentage::new(parse_stored_decimal(&quote.discount_percent)?)?,
            iva_rate: Percentage::new(parse_stored_decimal(&quote.iva_rate)?)?,
            totals: QuoteTotals {
                subtotal: parse_stored_decimal(&quote.subtotal)?,
                discount_amount: parse_stored_decimal(&quote.discount_amount)?,
                net: parse_stored_decimal(&quote.net)?,
                iva_amount: parse_stored_decimal(&quote.iva_amount)?,
                total: parse_stored_decimal(&quote.total)?,
            },
            valid_until: quote.valid_until,
            created_by: UserId::try_from(quote.created_by)?,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        })
    }
}

impl TryFrom<QuoteItem> for DomainQuoteItem {
    type Error = TypeConstraintError;

    fn try_from(item: QuoteItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: item.id,
            quote_id: QuoteId::try_from(item.quote_id)?,
            position: item.position,
            product_id: item.product_id.map(ProductId::try_from).transpose()?,
            description: ItemDescription::new(item.description)?,
            quantity: Quantity::new(parse_stored_decimal(&item.quantity)?)?,
            unit_price: Money::new(parse_stored_decimal(&item.unit_price)?)?,
            discount_percent: Percentage::new(parse_stored_decimal(&item.discount_percent)?)?,
            line_total: parse_stored_decimal(&item.line_total)?,
        })
    }
}
