//! Quotations (cotizaciones): line items, totals and status lifecycle.

use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::types::{
    CompanyId, ContactId, CustomerName, Email, ItemDescription, Money, Percentage, ProductId,
    Quantity, QuoteId, TypeConstraintError, UserId, round_amount,
};

/// Formats the human facing quote number, e.g. `COT-00042`.
pub fn format_quote_number(prefix: &str, sequence: i32) -> String {
    format!("{prefix}-{sequence:05}")
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    /// Spanish label used in templates and the PDF.
    pub fn label(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Borrador",
            QuoteStatus::Sent => "Enviada",
            QuoteStatus::Accepted => "Aceptada",
            QuoteStatus::Rejected => "Rechazada",
            QuoteStatus::Expired => "Vencida",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            QuoteStatus::Accepted | QuoteStatus::Rejected | QuoteStatus::Expired
        )
    }

    /// `draft -> sent -> accepted | rejected`; any open quote may expire.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        match (self, next) {
            (QuoteStatus::Draft, QuoteStatus::Sent) => true,
            (QuoteStatus::Sent, QuoteStatus::Accepted | QuoteStatus::Rejected) => true,
            (current, QuoteStatus::Expired) => !current.is_final(),
            _ => false,
        }
    }
}

impl Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for QuoteStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown status '{value}'")))
    }
}

/// Validated quotation line before it is stored.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteItemDraft {
    pub product_id: Option<ProductId>,
    pub description: ItemDescription,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub discount_percent: Percentage,
    gross: Decimal,
    line_total: Decimal,
}

impl QuoteItemDraft {
    /// Builds a line and computes its total, failing when the amount does
    /// not fit in a decimal.
    pub fn try_new(
        product_id: Option<ProductId>,
        description: ItemDescription,
        quantity: Quantity,
        unit_price: Money,
        discount_percent: Percentage,
    ) -> Result<Self, TypeConstraintError> {
        let gross = quantity
            .get()
            .checked_mul(unit_price.get())
            .map(round_amount)
            .ok_or_else(|| TypeConstraintError::InvalidAmount(format!("{quantity} x {unit_price}")))?;
        let line_total = gross
            .checked_sub(discount_percent.of(gross)?)
            .ok_or_else(|| TypeConstraintError::InvalidAmount(gross.to_string()))?;
        Ok(Self {
            product_id,
            description,
            quantity,
            unit_price,
            discount_percent,
            gross,
            line_total,
        })
    }

    /// `quantity * unit_price` before the line discount.
    pub fn gross(&self) -> Decimal {
        self.gross
    }

    /// Line amount after the line discount.
    pub fn line_total(&self) -> Decimal {
        self.line_total
    }
}

/// Monetary summary of a quotation.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Default)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub net: Decimal,
    pub iva_amount: Decimal,
    pub total: Decimal,
}

impl QuoteTotals {
    /// Computes totals for net-priced items with a global discount and IVA.
    pub fn compute(
        items: &[QuoteItemDraft],
        discount: Percentage,
        iva_rate: Percentage,
    ) -> Result<Self, TypeConstraintError> {
        let overflow = |value: Decimal| TypeConstraintError::InvalidAmount(value.to_string());

        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()))
            .ok_or_else(|| overflow(Decimal::MAX))?;
        let discount_amount = discount.of(subtotal)?;
        let net = subtotal
            .checked_sub(discount_amount)
            .ok_or_else(|| overflow(subtotal))?;
        let iva_amount = iva_rate.of(net)?;
        let total = net.checked_add(iva_amount).ok_or_else(|| overflow(net))?;
        Ok(Self {
            subtotal,
            discount_amount,
            net,
            iva_amount,
            total,
        })
    }
}

/// Addressee of a quotation: a snapshot plus optional CRM links.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuoteCustomer {
    pub company_id: Option<CompanyId>,
    pub contact_id: Option<ContactId>,
    pub name: CustomerName,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewQuote {
    pub customer: QuoteCustomer,
    pub notes: Option<String>,
    pub discount_percent: Percentage,
    pub iva_rate: Percentage,
    pub items: Vec<QuoteItemDraft>,
    pub valid_until: NaiveDate,
    pub created_by: UserId,
    totals: QuoteTotals,
}

impl NewQuote {
    /// Fails when no items are given or the totals overflow.
    pub fn try_new(
        customer: QuoteCustomer,
        notes: Option<String>,
        discount_percent: Percentage,
        iva_rate: Percentage,
        items: Vec<QuoteItemDraft>,
        valid_until: NaiveDate,
        created_by: UserId,
    ) -> Result<Self, TypeConstraintError> {
        if items.is_empty() {
            return Err(TypeConstraintError::InvalidValue(
                "a quote needs at least one item".to_string(),
            ));
        }
        let totals = QuoteTotals::compute(&items, discount_percent, iva_rate)?;
        Ok(Self {
            customer,
            notes: notes
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            discount_percent,
            iva_rate,
            items,
            valid_until,
            created_by,
            totals,
        })
    }

    pub fn totals(&self) -> QuoteTotals {
        self.totals
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Quote {
    pub id: QuoteId,
    pub sequence: i32,
    pub number: String,
    pub customer: QuoteCustomer,
    pub status: QuoteStatus,
    pub notes: Option<String>,
    pub discount_percent: Percentage,
    pub iva_rate: Percentage,
    pub totals: QuoteTotals,
    pub valid_until: NaiveDate,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuoteItem {
    pub id: i32,
    pub quote_id: QuoteId,
    pub position: i32,
    pub product_id: Option<ProductId>,
    pub description: ItemDescription,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub discount_percent: Percentage,
    pub line_total: Decimal,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuoteWithItems {
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(qty: &str, price: &str, discount: &str) -> QuoteItemDraft {
        QuoteItemDraft::try_new(
            None,
            ItemDescription::new("Item").unwrap(),
            Quantity::parse(qty).unwrap(),
            Money::parse(price).unwrap(),
            Percentage::parse(discount).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn quote_number_is_zero_padded() {
        assert_eq!(format_quote_number("COT", 42), "COT-00042");
        assert_eq!(format_quote_number("Q", 123456), "Q-123456");
    }

    #[test]
    fn line_total_applies_line_discount() {
        let line = item("3", "1000", "10");
        assert_eq!(line.gross(), dec("3000"));
        assert_eq!(line.line_total(), dec("2700"));
    }

    #[test]
    fn totals_apply_global_discount_then_iva() {
        let items = vec![item("2", "10000", "0"), item("1", "5000", "20")];
        let totals = QuoteTotals::compute(
            &items,
            Percentage::parse("5").unwrap(),
            Percentage::parse("19").unwrap(),
        )
        .unwrap();
        assert_eq!(totals.subtotal, dec("24000"));
        assert_eq!(totals.discount_amount, dec("1200"));
        assert_eq!(totals.net, dec("22800"));
        assert_eq!(totals.iva_amount, dec("4332"));
        assert_eq!(totals.total, dec("27132"));
    }

    #[test]
    fn totals_round_half_away_from_zero() {
        let items = vec![item("1", "0.05", "50")];
        let totals =
            QuoteTotals::compute(&items, Percentage::ZERO, Percentage::parse("19").unwrap())
                .unwrap();
        // 0.05 - 0.025 -> 0.05 - 0.03
        assert_eq!(totals.subtotal, dec("0.02"));
        assert_eq!(totals.iva_amount, dec("0.00"));
        assert_eq!(totals.total, dec("0.02"));
    }

    #[test]
    fn largest_accepted_line_does_not_overflow() {
        let line = item("1000000", "1000000000000", "0");
        assert_eq!(line.line_total(), dec("1000000000000000000"));
        let totals = QuoteTotals::compute(
            &[line.clone(), line],
            Percentage::ZERO,
            Percentage::parse("100").unwrap(),
        )
        .unwrap();
        assert_eq!(totals.total, dec("4000000000000000000"));
    }

    #[test]
    fn oversized_line_values_are_rejected_before_arithmetic() {
        assert_eq!(
            Quantity::parse("9999999999999999999999"),
            Err(TypeConstraintError::AmountTooLarge(crate::domain::types::MAX_QUANTITY))
        );
        assert!(Money::parse("99999999999999").is_err());
    }

    #[test]
    fn empty_quote_is_rejected() {
        let customer = QuoteCustomer {
            company_id: None,
            contact_id: None,
            name: CustomerName::new("Cliente").unwrap(),
            email: None,
            phone: None,
        };
        let result = NewQuote::try_new(
            customer,
            None,
            Percentage::ZERO,
            Percentage::ZERO,
            vec![],
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            UserId::new(1).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn status_transitions() {
        use QuoteStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Accepted));
        assert!(Sent.can_transition_to(Rejected));
        assert!(Draft.can_transition_to(Expired));
        assert!(!Draft.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Expired));
        assert!(!Expired.can_transition_to(Sent));
        assert_eq!(QuoteStatus::try_from("sent"), Ok(Sent));
        assert!(QuoteStatus::try_from("lost").is_err());
    }
}
