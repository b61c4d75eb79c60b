//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod currency;
pub mod dates;
pub mod number;
pub mod patterns;
pub mod tax;

pub use amounts::{parse_amount, AmountBlock, AmountBlockExtractor, AmountNormalizer};
pub use currency::CurrencyExtractor;
pub use dates::{normalize_date, DateExtractor, DateLayout};
pub use number::{InvoiceNumber, InvoiceNumberExtractor, NumberRule};
pub use tax::{TaxCalculator, TaxRateExtractor};

use crate::models::record::Currency;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched substring with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Start offset, or `usize::MAX` when unknown.
    pub fn start(&self) -> usize {
        self.position.map(|(start, _)| start).unwrap_or(usize::MAX)
    }
}

/// Per-label results of scanning one document.
///
/// Each field is the first match for its label, or `None`.
#[derive(Debug, Clone, Default)]
pub struct DocumentMatches {
    pub invoice_number: Option<ExtractionMatch<InvoiceNumber>>,
    pub invoice_date: Option<ExtractionMatch<String>>,
    pub amount_block: Option<ExtractionMatch<AmountBlock>>,
    pub tax_rate: Option<ExtractionMatch<String>>,
    pub currency: Option<ExtractionMatch<Currency>>,
}

impl DocumentMatches {
    /// Run every label's extractor over the text.
    pub fn scan(text: &str) -> Self {
        Self {
            invoice_number: InvoiceNumberExtractor::new().extract(text),
            invoice_date: DateExtractor::new().extract(text),
            amount_block: AmountBlockExtractor::new().extract(text),
            tax_rate: TaxRateExtractor::new().extract(text),
            currency: CurrencyExtractor::new().extract(text),
        }
    }
}
