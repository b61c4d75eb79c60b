//! Amount block extraction and net amount normalization.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::record::{Currency, Money};

use super::patterns::{AMOUNT_LABELED, AMOUNT_NET_SUM};
use super::{ExtractionMatch, FieldExtractor};

/// The layout an amount block was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountBlock {
    /// `Total: €1.234,56` style: keyword, optional currency, amount.
    Labeled { net: String },
    /// `Nettosumme 19 % 150,00 €` style: keyword, rate, amount, currency.
    NetSum { rate: String, net: String },
}

impl AmountBlock {
    /// Raw net amount substring.
    pub fn net(&self) -> &str {
        match self {
            Self::Labeled { net } | Self::NetSum { net, .. } => net,
        }
    }

    /// Percentage carried by the block itself, if its layout has one.
    pub fn rate(&self) -> Option<&str> {
        match self {
            Self::Labeled { .. } => None,
            Self::NetSum { rate, .. } => Some(rate),
        }
    }
}

/// Amount block extractor.
pub struct AmountBlockExtractor;

impl AmountBlockExtractor {
    pub fn new() -> Self {
        Self
    }

    fn labeled(text: &str) -> impl Iterator<Item = ExtractionMatch<AmountBlock>> + '_ {
        AMOUNT_LABELED.captures_iter(text).filter_map(|caps| {
            let net = caps.name("net")?;
            let full_match = caps.get(0)?;
            Some(
                ExtractionMatch::new(
                    AmountBlock::Labeled {
                        net: net.as_str().to_string(),
                    },
                    full_match.as_str(),
                )
                .with_position(full_match.start(), full_match.end()),
            )
        })
    }

    fn net_sum(text: &str) -> impl Iterator<Item = ExtractionMatch<AmountBlock>> + '_ {
        AMOUNT_NET_SUM.captures_iter(text).filter_map(|caps| {
            let rate = caps.name("rate")?;
            let net = caps.name("net")?;
            let full_match = caps.get(0)?;
            Some(
                ExtractionMatch::new(
                    AmountBlock::NetSum {
                        rate: rate.as_str().to_string(),
                        net: net.as_str().to_string(),
                    },
                    full_match.as_str(),
                )
                .with_position(full_match.start(), full_match.end()),
            )
        })
    }
}

impl Default for AmountBlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountBlockExtractor {
    type Output = ExtractionMatch<AmountBlock>;

    /// The earliest block in the text, whichever layout it uses.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let labeled = Self::labeled(text).next();
        let net_sum = Self::net_sum(text).next();

        match (labeled, net_sum) {
            (Some(a), Some(b)) if b.start() < a.start() => Some(b),
            (Some(a), _) => Some(a),
            (None, b) => b,
        }
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<_> = Self::labeled(text).chain(Self::net_sum(text)).collect();
        results.sort_by_key(|m| m.start());
        results
    }
}

/// Parse an amount whose last `,` or `.` is the decimal separator
/// (e.g., "1.234,56", "1,234.56" or "150,00").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind([',', '.']) {
        Some(pos) => {
            let (integer, fraction) = cleaned.split_at(pos);
            let integer: String = integer.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("{}.{}", integer, &fraction[1..])
        }
        None => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Turns a raw amount substring into a net amount in the reference currency.
#[derive(Debug, Clone)]
pub struct AmountNormalizer {
    /// Reference-currency units per dollar.
    usd_rate: Decimal,
}

impl AmountNormalizer {
    pub fn new(usd_rate: Decimal) -> Self {
        Self { usd_rate }
    }

    /// Normalize `raw` found in a document whose currency sign is `currency`.
    pub fn normalize(&self, raw: &str, currency: Option<Currency>) -> Result<Money, ExtractionError> {
        let parse_error = || ExtractionError::Parse {
            field: "net_amount".to_string(),
            value: raw.to_string(),
        };

        let amount = parse_amount(raw)
            .and_then(Money::round)
            .ok_or_else(parse_error)?;

        let amount = match currency {
            Some(Currency::Dollar) => {
                let converted = amount
                    .checked_mul(self.usd_rate)
                    .and_then(Money::round)
                    .ok_or_else(parse_error)?;
                debug!("Converted {}$ to {}{}", amount, converted, Currency::REFERENCE);
                converted
            }
            Some(Currency::Euro) | None => amount,
        };

        Money::reference(amount).ok_or_else(parse_error)
    }
}

impl Default for AmountNormalizer {
    fn default() -> Self {
        Self::new(Decimal::new(93, 2))
    }
}
