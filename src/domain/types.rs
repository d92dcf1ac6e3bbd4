//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, non-negative amounts) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Provided url failed format validation.
    #[error("invalid url address")]
    InvalidUrl,
    /// Provided amount could not be parsed as a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Provided amount was negative.
    #[error("amount cannot be negative")]
    NegativeAmount,
    /// Provided percentage was outside of `0..=100`.
    #[error("percentage must be between 0 and 100")]
    PercentageOutOfRange,
    /// Provided quantity was zero or negative.
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    /// Provided amount or quantity exceeded the accepted maximum.
    #[error("value exceeds the maximum of {0}")]
    AmountTooLarge(Decimal),
}

/// Number of decimal places kept for stored amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest unit price or product price accepted (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest quantity accepted on a quotation line (one million).
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Rounds an amount half away from zero to [`AMOUNT_SCALE`] places.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a user supplied amount such as `1234.5`, `1234,5`, `1.234,50` or `$ 1.234,50`.
///
/// Currency symbols and whitespace are dropped. When both `.` and `,` are
/// present the right-most one is the decimal separator. A lone `,` is a
/// decimal separator, otherwise `.` is.
pub fn parse_amount(raw: &str) -> Result<Decimal, TypeConstraintError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return Err(TypeConstraintError::InvalidAmount(raw.trim().to_string()));
    }

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized)
        .map_err(|_| TypeConstraintError::InvalidAmount(raw.trim().to_string()))
}

/// Folds a character with a Spanish diacritic onto its ASCII base letter.
pub fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
        'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// Builds the comparison key used to deduplicate names: accents folded,
/// lower-cased, whitespace collapsed and trimmed.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(fold_accent)
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Converts free text into a URL slug (`Café Molido 1kg` -> `cafe-molido-1kg`).
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in normalize_key(value).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Currencies quoted without decimal places.
const ZERO_DECIMAL_CURRENCIES: [&str; 4] = ["CLP", "PYG", "JPY", "KRW"];

/// Formats an amount the way it is printed on quotes: `.` groups thousands,
/// `,` separates decimals and peso-style currencies carry a `$` sign
/// (`$27.132`, `USD 1.234,50`).
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let currency = currency.trim().to_uppercase();
    let places = if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        0
    } else {
        2
    };
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", places as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push(',');
        grouped.push_str(frac_part);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match currency.as_str() {
        "CLP" | "ARS" | "COP" | "MXN" => format!("{sign}${grouped}"),
        "" => format!("{sign}{grouped}"),
        code => format!("{sign}{code} {grouped}"),
    }
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(UserId, "Unique identifier for a back-office user.");
id_newtype!(CategoryId, "Unique identifier for a product category.");
id_newtype!(ProductId, "Unique identifier for a product.");
id_newtype!(CompanyId, "Unique identifier for a customer company (empresa).");
id_newtype!(ContactId, "Unique identifier for a customer contact (contacto).");
id_newtype!(QuoteId, "Unique identifier for a quotation (cotización).");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Email {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(UserName, "Display name of a back-office user.");
non_empty_string_newtype!(CategoryName, "Category name enforcing non-empty values.");
non_empty_string_newtype!(ProductName, "Product name enforcing non-empty values.");
non_empty_string_newtype!(Sku, "Stock keeping unit code, trimmed and non-empty.");
non_empty_string_newtype!(CompanyName, "Company (empresa) name enforcing non-empty values.");
non_empty_string_newtype!(ContactName, "Contact (contacto) name enforcing non-empty values.");
non_empty_string_newtype!(
    CustomerName,
    "Name printed on a quotation as its addressee."
);
non_empty_string_newtype!(
    ItemDescription,
    "Quotation line description enforcing non-empty values."
);

/// URL slug made of lower-case ASCII letters, digits and single dashes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Derives a slug from free text, rejecting values with no usable characters.
    pub fn from_text(value: &str) -> Result<Self, TypeConstraintError> {
        let slug = slugify(value);
        if slug.is_empty() {
            return Err(TypeConstraintError::InvalidValue(format!(
                "cannot derive slug from '{}'",
                value.trim()
            )));
        }
        Ok(Self(slug))
    }

    /// Wraps an already stored slug after checking its shape.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into();
        if !value.is_empty() && slugify(&value) == value {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidValue(format!("invalid slug '{value}'")))
        }
    }

    /// Returns the slug with a numeric suffix, e.g. `cafe` -> `cafe-2`.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Validated absolute URL (product images, company websites).
pub struct WebUrl(String);

impl WebUrl {
    /// Ensures a trimmed URL is non-empty and well formed before wrapping.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = NonEmptyString::new(value)?;

        if !url.as_str().validate_url() {
            Err(TypeConstraintError::InvalidUrl)
        } else {
            Ok(Self(url.into_inner()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for WebUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative monetary amount rounded to [`AMOUNT_SCALE`] places.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Rejects negative values and rounds to the storage scale.
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TypeConstraintError::NegativeAmount);
        }
        if value > MAX_AMOUNT {
            return Err(TypeConstraintError::AmountTooLarge(MAX_AMOUNT));
        }
        Ok(Self(round_amount(value)))
    }

    /// Parses user input using [`parse_amount`].
    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        Self::new(parse_amount(raw)?)
    }

    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Percentage constrained to `0..=100` (discounts, IVA rate).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(TypeConstraintError::PercentageOutOfRange);
        }
        Ok(Self(value.normalize()))
    }

    /// Parses user input; an empty string means zero.
    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        let raw = raw.trim().trim_end_matches('%');
        if raw.trim().is_empty() {
            return Ok(Self::ZERO);
        }
        Self::new(parse_amount(raw)?)
    }

    pub const fn get(self) -> Decimal {
        self.0
    }

    /// Applies the percentage to an amount (`amount * pct / 100`), rounded.
    pub fn of(self, amount: Decimal) -> Result<Decimal, TypeConstraintError> {
        amount
            .checked_mul(self.0)
            .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
            .map(round_amount)
            .ok_or_else(|| TypeConstraintError::InvalidAmount(amount.to_string()))
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly positive quantity of a quotation line.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        if value <= Decimal::ZERO {
            return Err(TypeConstraintError::NonPositiveQuantity);
        }
        if value > MAX_QUANTITY {
            return Err(TypeConstraintError::AmountTooLarge(MAX_QUANTITY));
        }
        Ok(Self(value.normalize()))
    }

    pub fn parse(raw: &str) -> Result<Self, TypeConstraintError> {
        Self::new(parse_amount(raw)?)
    }

    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
