//! Invoice record produced by the extraction pipeline.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Currencies recognised in invoice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Euro, the reference currency of every output amount.
    #[serde(rename = "EUR")]
    Euro,
    /// US dollar.
    #[serde(rename = "USD")]
    Dollar,
}

impl Currency {
    /// The currency all monetary output is normalized to.
    pub const REFERENCE: Currency = Currency::Euro;

    /// Parse a currency sign (`€` or `$`).
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.trim() {
            "€" => Some(Self::Euro),
            "$" => Some(Self::Dollar),
            _ => None,
        }
    }

    /// Sign used when printing amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Euro => "€",
            Self::Dollar => "$",
        }
    }

    /// Whether this is the reference currency.
    pub fn is_reference(&self) -> bool {
        *self == Self::REFERENCE
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A monetary amount with exactly two fractional digits.
///
/// Serialized as a single string such as `"150.00€"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Create an amount, rounding it to two fractional digits.
    ///
    /// `None` when the amount is too large to carry two fractional digits.
    pub fn new(amount: Decimal, currency: Currency) -> Option<Self> {
        Some(Self {
            amount: Self::round(amount)?,
            currency,
        })
    }

    /// Create an amount in the reference currency.
    pub fn reference(amount: Decimal) -> Option<Self> {
        Self::new(amount, Currency::REFERENCE)
    }

    /// Round half away from zero to exactly two fractional digits.
    pub fn round(amount: Decimal) -> Option<Decimal> {
        let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        // rescale keeps a smaller scale when the mantissa would overflow
        (rounded.scale() == 2).then_some(rounded)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}{}", self.amount, self.currency)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl FromStr for Money {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || ExtractionError::Parse {
            field: "money".to_string(),
            value: s.to_string(),
        };

        let s = s.trim();
        let split = s
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .ok_or_else(parse_error)?;
        let (number, sign) = s.split_at(split);
        let currency = Currency::from_symbol(sign).ok_or_else(parse_error)?;
        let amount = Decimal::from_str(number.trim()).map_err(|_| parse_error())?;

        Self::new(amount, currency).ok_or_else(parse_error)
    }
}

impl TryFrom<String> for Money {
    type Error = ExtractionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Structured fields scraped from one invoice document.
///
/// Absent fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Identifier matched in the source text.
    pub invoice_number: Option<String>,

    /// Invoice date in `DD.MM.YYYY` form.
    pub invoice_date: Option<String>,

    /// Net amount plus tax.
    pub gross_amount: Option<Money>,

    /// Amount before tax, in the reference currency.
    pub net_amount: Option<Money>,
}

impl InvoiceRecord {
    /// Check if no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.invoice_number.is_none()
            && self.invoice_date.is_none()
            && self.gross_amount.is_none()
            && self.net_amount.is_none()
    }

    /// Names of the fields that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_number.is_none() {
            missing.push("invoice_number");
        }
        if self.invoice_date.is_none() {
            missing.push("invoice_date");
        }
        if self.gross_amount.is_none() {
            missing.push("gross_amount");
        }
        if self.net_amount.is_none() {
            missing.push("net_amount");
        }
        missing
    }
}
