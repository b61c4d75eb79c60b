//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Full month names accepted in dates (English and German).
const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|januar|jänner|februar|märz|maerz|mai|juni|juli|oktober|dezember";

/// Amount with `,` or `.` as decimal separator and optional thousands groups.
const AMOUNT: &str = r"\d{1,3}(?:[.,\u{00a0} ]\d{3})+[.,]\d{2}|\d+[.,]\d{2}";

lazy_static! {
    // Invoice number patterns, in priority order
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:rechnungs-?\s*nummer|rechnungs-?\s*nr\b\.?|rechnung\s+nr\b\.?|invoice\s+(?:number|no\b\.?|#))[\s:#.]*(?P<number>[a-z0-9][a-z0-9/_\-]*)"
    ).unwrap();

    pub static ref PAYMENT_ID: Regex = Regex::new(
        r"\b(?P<number>[A-Z0-9]{4,}(?:-[A-Z0-9]{4,})+)\b"
    ).unwrap();

    pub static ref STANDALONE_NUMBER: Regex = Regex::new(
        r"(?m)^[ \t]*(?P<number>\d{4})[ \t]*\r?$"
    ).unwrap();

    // Invoice date in any of the known layouts, optionally labeled
    pub static ref INVOICE_DATE: Regex = Regex::new(&format!(
        r"(?i)(?:(?:rechnungsdatum|invoice\s+date|date\s+of\s+issue|date\s+paid|datum|date)[\s:]*)?\b(?P<date>\d{{1,2}}\.\d{{1,2}}\.\d{{4}}|(?:{months})\s+\d{{1,2}},\s*\d{{4}}|\d{{1,2}}/\d{{1,2}}/\d{{4}}|\d{{1,2}}\.\s*(?:{months})\s+\d{{4}})\b",
        months = MONTH_NAMES
    )).unwrap();

    // Canonical DD.MM.YYYY shape, checked without calendar validation
    pub static ref CANONICAL_DATE: Regex = Regex::new(
        r"^(?:0\d|[12]\d|3[01])\.(?:0[1-9]|1[0-2])\.\d{4}$"
    ).unwrap();

    // Alternate date layouts understood by the date normalizer
    pub static ref DATE_MONTH_NAME_DAY_YEAR: Regex = Regex::new(
        r"(?i)^(?P<month>\p{L}+)\s+(?P<day>\d{1,2}),\s*(?P<year>\d{4})$"
    ).unwrap();

    pub static ref DATE_MONTH_DAY_YEAR_SLASH: Regex = Regex::new(
        r"^(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})$"
    ).unwrap();

    pub static ref DATE_DAY_MONTH_NAME_YEAR: Regex = Regex::new(
        r"(?i)^(?P<day>\d{1,2})\.\s*(?P<month>\p{L}+)\s+(?P<year>\d{4})$"
    ).unwrap();

    pub static ref DATE_DAY_MONTH_YEAR_DOTTED: Regex = Regex::new(
        r"^(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?P<year>\d{4})$"
    ).unwrap();

    // Amount block: keyword, optional currency sign, amount
    pub static ref AMOUNT_LABELED: Regex = Regex::new(&format!(
        r"(?i)\b(?:total\s+amount|total\s+paid|total|net\s+value|gesamtbetrag|nettobetrag|nettowert|gesamt)\b[\s:]*(?:[€$]\s*)?(?P<net>{amount})\b",
        amount = AMOUNT
    )).unwrap();

    // Amount block: net-sum keyword, percentage, amount, currency sign
    pub static ref AMOUNT_NET_SUM: Regex = Regex::new(&format!(
        r"(?i)\b(?:net\s+sum|nettosumme|summe\s+netto)\b[\s:]*(?P<rate>\d{{1,2}})\s*%\s*(?P<net>{amount})\s*[€$]",
        amount = AMOUNT
    )).unwrap();

    // Tax rate: one or two digits immediately followed by a percent sign
    pub static ref TAX_RATE: Regex = Regex::new(
        r"\b(?P<rate>\d{1,2})%"
    ).unwrap();

    pub static ref CURRENCY: Regex = Regex::new(
        r"[$€]"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        for pattern in [
            &*INVOICE_NUMBER,
            &*PAYMENT_ID,
            &*STANDALONE_NUMBER,
            &*INVOICE_DATE,
            &*CANONICAL_DATE,
            &*DATE_MONTH_NAME_DAY_YEAR,
            &*DATE_MONTH_DAY_YEAR_SLASH,
            &*DATE_DAY_MONTH_NAME_YEAR,
            &*DATE_DAY_MONTH_YEAR_DOTTED,
            &*AMOUNT_LABELED,
            &*AMOUNT_NET_SUM,
            &*TAX_RATE,
            &*CURRENCY,
        ] {
            assert!(!pattern.as_str().is_empty());
        }
    }

    #[test]
    fn test_canonical_date_shape() {
        assert!(CANONICAL_DATE.is_match("05.03.2024"));
        assert!(CANONICAL_DATE.is_match("31.02.2024"));
        assert!(CANONICAL_DATE.is_match("00.12.2024"));
        assert!(!CANONICAL_DATE.is_match("5.3.2024"));
        assert!(!CANONICAL_DATE.is_match("32.01.2024"));
        assert!(!CANONICAL_DATE.is_match("01.13.2024"));
    }

    #[test]
    fn test_amount_keyword_is_case_insensitive() {
        assert!(AMOUNT_LABELED.is_match("TOTAL: 10,00"));
        assert!(AMOUNT_LABELED.is_match("Gesamtbetrag 1.234,56 €"));
        assert!(!AMOUNT_LABELED.is_match("Subtotal 10,00"));
    }
}
