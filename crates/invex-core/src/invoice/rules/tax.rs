//! Tax rate detection and gross amount calculation.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::models::record::{Currency, Money};

use super::patterns::TAX_RATE;
use super::{ExtractionMatch, FieldExtractor};

/// Tax rate extractor.
///
/// Scans the whole document; the first percentage found anywhere is the
/// document's tax rate.
pub struct TaxRateExtractor;

impl TaxRateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TaxRateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TaxRateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TAX_RATE
            .captures_iter(text)
            .filter_map(|caps| {
                let rate = caps.name("rate")?;
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(rate.as_str().to_string(), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Derives the gross amount from a net amount and a tax rate.
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    /// Rate in percent used for euro documents without a stated rate.
    default_rate: Decimal,
}

impl TaxCalculator {
    pub fn new(default_rate: Decimal) -> Self {
        Self { default_rate }
    }

    /// Pick the rate for a document.
    ///
    /// `matched` is the document-wide percentage, `block_rate` the one carried
    /// by the amount block. Without either, euro documents get the default
    /// rate and everything else gets 0.
    pub fn resolve_rate(
        &self,
        matched: Option<&str>,
        block_rate: Option<&str>,
        currency: Option<Currency>,
    ) -> Result<Decimal, ExtractionError> {
        match matched.or(block_rate) {
            Some(raw) => Decimal::from_str(raw.trim()).map_err(|_| ExtractionError::Parse {
                field: "tax_rate".to_string(),
                value: raw.to_string(),
            }),
            None if currency.is_some_and(|c| c.is_reference()) => Ok(self.default_rate),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Gross amount for `net` at `rate` percent.
    pub fn gross(&self, net: Money, rate: Decimal) -> Result<Money, ExtractionError> {
        if rate.is_zero() {
            return Ok(net);
        }
        let out_of_range = || ExtractionError::Parse {
            field: "gross_amount".to_string(),
            value: format!("{} at {}%", net, rate),
        };

        rate.checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| Decimal::ONE.checked_add(fraction))
            .and_then(|factor| net.amount().checked_mul(factor))
            .and_then(|gross| Money::new(gross, net.currency()))
            .ok_or_else(out_of_range)
    }
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::new(Decimal::from(19))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn euro(s: &str) -> Money {
        Money::reference(Decimal::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn test_extract_first_percentage() {
        let extractor = TaxRateExtractor::new();

        let rate = extractor.extract("Rabatt 5% ... MwSt 19%").unwrap();
        assert_eq!(rate.value, "5");

        assert!(extractor.extract("MwSt 19 %").is_none());
        assert!(extractor.extract("Growth 120%").is_none());
    }

    #[test]
    fn test_resolve_matched_rate() {
        let calc = TaxCalculator::default();
        assert_eq!(
            calc.resolve_rate(Some("7"), Some("19"), Some(Currency::Euro)).unwrap(),
            Decimal::from(7)
        );
        assert_eq!(
            calc.resolve_rate(None, Some("19"), None).unwrap(),
            Decimal::from(19)
        );
    }

    #[test]
    fn test_resolve_default_rate() {
        let calc = TaxCalculator::default();
        assert_eq!(
            calc.resolve_rate(None, None, Some(Currency::Euro)).unwrap(),
            Decimal::from(19)
        );
        assert_eq!(
            calc.resolve_rate(None, None, Some(Currency::Dollar)).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(calc.resolve_rate(None, None, None).unwrap(), Decimal::ZERO);

        let calc = TaxCalculator::new(Decimal::from(7));
        assert_eq!(
            calc.resolve_rate(None, None, Some(Currency::Euro)).unwrap(),
            Decimal::from(7)
        );
    }

    #[test]
    fn test_literal_zero_rate_is_numeric_zero() {
        let calc = TaxCalculator::default();
        let rate = calc.resolve_rate(Some("0"), None, Some(Currency::Euro)).unwrap();
        assert!(rate.is_zero());

        let rate = calc.resolve_rate(Some("00"), None, Some(Currency::Euro)).unwrap();
        assert_eq!(calc.gross(euro("150.00"), rate).unwrap(), euro("150.00"));
    }

    #[test]
    fn test_resolve_malformed_rate() {
        let err = TaxCalculator::default()
            .resolve_rate(Some("x"), None, None)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }

    #[test]
    fn test_gross() {
        let calc = TaxCalculator::default();

        assert_eq!(calc.gross(euro("150.00"), Decimal::from(19)).unwrap(), euro("178.50"));
        assert_eq!(calc.gross(euro("100.00"), Decimal::from(7)).unwrap(), euro("107.00"));
        assert_eq!(calc.gross(euro("0.10"), Decimal::from(5)).unwrap(), euro("0.11"));
        assert_eq!(calc.gross(euro("33.33"), Decimal::from(19)).unwrap().to_string(), "39.66€");
    }

    #[test]
    fn test_gross_zero_rate_is_identity() {
        let calc = TaxCalculator::default();
        for net in ["0.00", "12.34", "99999.99"] {
            assert_eq!(calc.gross(euro(net), Decimal::ZERO).unwrap(), euro(net));
        }
    }

    #[test]
    fn test_gross_out_of_range() {
        let calc = TaxCalculator::default();
        let err = calc
            .gross(euro("700000000000000000000000000.00"), Decimal::from(19))
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Parse { ref field, .. } if field == "gross_amount"));
    }
}
