//! Currency sign detection.

use crate::models::record::Currency;

use super::patterns::CURRENCY;
use super::{ExtractionMatch, FieldExtractor};

/// Finds `$` and `€` signs anywhere in the text.
pub struct CurrencyExtractor;

impl CurrencyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyExtractor {
    type Output = ExtractionMatch<Currency>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY
            .find_iter(text)
            .filter_map(|m| {
                let currency = Currency::from_symbol(m.as_str())?;
                Some(ExtractionMatch::new(currency, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_sign_wins() {
        let extractor = CurrencyExtractor::new();

        let found = extractor.extract("Paid $20 (approx. 18,60 €)").unwrap();
        assert_eq!(found.value, Currency::Dollar);
        assert_eq!(found.position, Some((5, 6)));

        let found = extractor.extract("€ 10 or $ 11").unwrap();
        assert_eq!(found.value, Currency::Euro);
    }

    #[test]
    fn test_all_signs() {
        let all = CurrencyExtractor::new().extract_all("1 € 2 $ 3 €");
        let values: Vec<Currency> = all.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec![Currency::Euro, Currency::Dollar, Currency::Euro]);
    }

    #[test]
    fn test_currency_codes_are_ignored() {
        assert!(CurrencyExtractor::new().extract("Betrag 10,00 EUR").is_none());
    }
}
