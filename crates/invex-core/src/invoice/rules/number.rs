//! Invoice number extraction.

use regex::Regex;

use super::patterns::{INVOICE_NUMBER, PAYMENT_ID, STANDALONE_NUMBER};
use super::{ExtractionMatch, FieldExtractor};

/// The alternative that produced an invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRule {
    /// Token following an explicit invoice-number keyword.
    Keyword,
    /// Hyphen-joined upper-case token shaped like a payment identifier.
    PaymentId,
    /// Four-digit token alone on its line.
    Standalone,
}

impl NumberRule {
    /// Rules in the order they are tried; the first that matches wins.
    pub const PRIORITY: [NumberRule; 3] = [Self::Keyword, Self::PaymentId, Self::Standalone];

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Keyword => &INVOICE_NUMBER,
            Self::PaymentId => &PAYMENT_ID,
            Self::Standalone => &STANDALONE_NUMBER,
        }
    }

    fn accepts(&self, candidate: &str) -> bool {
        match self {
            // Plain words like "ABCD-EFGH" and year ranges like "2023-2024" are not identifiers
            Self::PaymentId => {
                candidate.chars().any(|c| c.is_ascii_digit())
                    && !candidate.split('-').all(is_year)
            }
            Self::Keyword | Self::Standalone => true,
        }
    }

    /// Every match of this rule in text order.
    pub fn find_all(&self, text: &str) -> Vec<ExtractionMatch<InvoiceNumber>> {
        self.pattern()
            .captures_iter(text)
            .filter_map(|caps| {
                let number = caps.name("number")?;
                if !self.accepts(number.as_str()) {
                    return None;
                }
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(
                        InvoiceNumber {
                            value: number.as_str().to_string(),
                            rule: *self,
                        },
                        full_match.as_str(),
                    )
                    .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

fn is_year(group: &str) -> bool {
    group.len() == 4
        && (group.starts_with("19") || group.starts_with("20"))
        && group.chars().all(|c| c.is_ascii_digit())
}

/// An extracted invoice number and the rule that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumber {
    pub value: String,
    pub rule: NumberRule,
}

/// Invoice number extractor.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<InvoiceNumber>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        NumberRule::PRIORITY
            .iter()
            .find_map(|rule| rule.find_all(text).into_iter().next())
    }

    /// All candidates, grouped by rule priority.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        NumberRule::PRIORITY
            .iter()
            .flat_map(|rule| rule.find_all(text))
            .collect()
    }
}
