//! Rule-based invoice parser.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{InvoiceRecord, Money};

use super::Result;
use super::rules::{normalize_date, AmountNormalizer, DocumentMatches, TaxCalculator};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice record.
    pub record: InvoiceRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Why extraction was abandoned, when the record is empty because of a failure.
    pub error: Option<ExtractionError>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Whether extraction ran to completion.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Extract a record from text, surfacing the first failure.
    fn try_parse(&self, text: &str) -> Result<InvoiceRecord>;

    /// Extract a record from text.
    ///
    /// Never fails: a failure is logged and yields an all-absent record.
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        match self.try_parse(text) {
            Ok(record) => {
                let warnings: Vec<String> = record
                    .missing_fields()
                    .into_iter()
                    .map(|field| format!("Could not extract {}", field))
                    .collect();

                debug!(
                    "Extracted invoice {:?} with {} missing fields",
                    record.invoice_number,
                    warnings.len()
                );

                ExtractionResult {
                    record,
                    warnings,
                    error: None,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
            Err(e) => {
                error!("Extraction failed, returning empty record: {}", e);
                ExtractionResult {
                    record: InvoiceRecord::default(),
                    warnings: vec![format!("Extraction failed: {}", e)],
                    error: Some(e),
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
        }
    }
}

/// Invoice parser driven by the pattern rules.
///
/// Holds only immutable settings, so one instance can serve any number of
/// documents and threads.
#[derive(Debug, Clone, Default)]
pub struct RuleInvoiceParser {
    normalizer: AmountNormalizer,
    calculator: TaxCalculator,
}

impl RuleInvoiceParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_usd_rate(config.usd_to_eur_rate)
            .with_default_tax_rate(config.default_tax_rate)
    }

    /// Set the dollar exchange rate.
    pub fn with_usd_rate(mut self, rate: Decimal) -> Self {
        self.normalizer = AmountNormalizer::new(rate);
        self
    }

    /// Set the tax rate assumed for euro documents without one.
    pub fn with_default_tax_rate(mut self, rate: Decimal) -> Self {
        self.calculator = TaxCalculator::new(rate);
        self
    }

    fn amounts(&self, matches: &DocumentMatches) -> Result<(Option<Money>, Option<Money>)> {
        let Some(block) = &matches.amount_block else {
            return Ok((None, None));
        };
        let currency = matches.currency.as_ref().map(|m| m.value);

        let net = self.normalizer.normalize(block.value.net(), currency)?;
        let rate = self.calculator.resolve_rate(
            matches.tax_rate.as_ref().map(|m| m.value.as_str()),
            block.value.rate(),
            currency,
        )?;
        let gross = self.calculator.gross(net, rate)?;

        debug!("Net {} at {}% gives gross {}", net, rate, gross);

        Ok((Some(net), Some(gross)))
    }
}

impl InvoiceParser for RuleInvoiceParser {
    fn try_parse(&self, text: &str) -> Result<InvoiceRecord> {
        let matches = DocumentMatches::scan(text);

        let invoice_number = matches.invoice_number.as_ref().map(|m| m.value.value.clone());
        let invoice_date = matches
            .invoice_date
            .as_ref()
            .map(|m| normalize_date(&m.value))
            .transpose()?;
        let (net_amount, gross_amount) = self.amounts(&matches)?;

        Ok(InvoiceRecord {
            invoice_number,
            invoice_date,
            gross_amount,
            net_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn euro(s: &str) -> Option<Money> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_parse_euro_invoice() {
        let text = r#"
            Muster GmbH
            Rechnungsnummer: RE-2024-017
            Rechnungsdatum: 05.03.2024

            Pos. Beschreibung           Betrag
            1    Beratung                150,00 €

            Total: €150,00
            zzgl. 19% MwSt.
        "#;

        let result = RuleInvoiceParser::new().parse(text);

        assert!(result.is_ok());
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.record,
            InvoiceRecord {
                invoice_number: Some("RE-2024-017".to_string()),
                invoice_date: Some("05.03.2024".to_string()),
                gross_amount: euro("178.50€"),
                net_amount: euro("150.00€"),
            }
        );
    }

    #[test]
    fn test_parse_month_name_date() {
        let text = "Rechnung Nr. 88\nRechnungsdatum: 5. März 2024\n";
        let result = RuleInvoiceParser::new().parse(text);

        assert_eq!(result.record.invoice_date.as_deref(), Some("05.03.2024"));
        assert_eq!(result.record.invoice_number.as_deref(), Some("88"));
    }

    #[test]
    fn test_parse_without_amount_block() {
        let text = "Invoice number: INV-7\nThank you for your order.";
        let result = RuleInvoiceParser::new().parse(text);

        assert!(result.is_ok());
        assert_eq!(result.record.invoice_number.as_deref(), Some("INV-7"));
        assert_eq!(result.record.net_amount, None);
        assert_eq!(result.record.gross_amount, None);
        assert_eq!(
            result.warnings,
            vec![
                "Could not extract invoice_date",
                "Could not extract gross_amount",
                "Could not extract net_amount",
            ]
        );
    }

    #[test]
    fn test_unparseable_date_empties_record() {
        let text = "Invoice number: INV-8\nDate: 13/45/2024\nTotal: €10,00";
        let parser = RuleInvoiceParser::new();

        let result = parser.parse(text);
        assert!(result.record.is_empty());
        assert_eq!(
            result.error,
            Some(ExtractionError::InvalidDateFormat("13/45/2024".to_string()))
        );

        assert!(parser.try_parse(text).is_err());
    }

    #[test]
    fn test_dollar_invoice_without_rate() {
        let text = "Invoice #A-1\nMarch 5, 2024\nTotal paid $100.00";
        let record = RuleInvoiceParser::new().parse(text).record;

        assert_eq!(record.invoice_date.as_deref(), Some("05.03.2024"));
        assert_eq!(record.net_amount, euro("93.00€"));
        assert_eq!(record.gross_amount, euro("93.00€"));
    }

    #[test]
    fn test_euro_invoice_without_rate_uses_default() {
        let text = "Gesamtbetrag 100,00 €";

        let record = RuleInvoiceParser::new().parse(text).record;
        assert_eq!(record.gross_amount, euro("119.00€"));

        let record = RuleInvoiceParser::new()
            .with_default_tax_rate(Decimal::from(7))
            .parse(text)
            .record;
        assert_eq!(record.gross_amount, euro("107.00€"));
    }

    #[test]
    fn test_zero_rate_gross_equals_net() {
        let text = "Total: 99,99 €\nSteuersatz 0%";
        let record = RuleInvoiceParser::new().parse(text).record;

        assert_eq!(record.net_amount, euro("99.99€"));
        assert_eq!(record.gross_amount, record.net_amount);
    }

    #[test]
    fn test_net_sum_layout() {
        let text = "Nettosumme 7 % 200,00 €\nUSt. 14,00 €\nBrutto 214,00 €";
        let record = RuleInvoiceParser::new().parse(text).record;

        assert_eq!(record.net_amount, euro("200.00€"));
        assert_eq!(record.gross_amount, euro("214.00€"));
    }

    #[test]
    fn test_out_of_range_amount_empties_record() {
        let text = "Rechnungsnummer: 12\nTotal: 70000000000000000000000000000,00 €\n19%";
        let result = RuleInvoiceParser::new().parse(text);

        assert_eq!(result.record, InvoiceRecord::default());
        assert!(matches!(result.error, Some(ExtractionError::Parse { .. })));
    }

    #[test]
    fn test_gross_out_of_range_empties_record() {
        let text = "Total: 700.000.000.000.000.000.000.000.000,00 €\n19%";
        let result = RuleInvoiceParser::new().parse(text);

        assert!(result.record.is_empty());
        assert!(matches!(
            result.error,
            Some(ExtractionError::Parse { ref field, .. }) if field == "gross_amount"
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            usd_to_eur_rate: Decimal::new(90, 2),
            default_tax_rate: Decimal::from(19),
        };
        let record = RuleInvoiceParser::from_config(&config)
            .parse("Total $ 10.00")
            .record;

        assert_eq!(record.net_amount, euro("9.00€"));
    }

    #[test]
    fn test_parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleInvoiceParser>();
    }
}
