//! Invoice date extraction and normalization.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::trace;

use crate::error::ExtractionError;

use super::patterns::{
    CANONICAL_DATE, DATE_DAY_MONTH_NAME_YEAR, DATE_DAY_MONTH_YEAR_DOTTED,
    DATE_MONTH_DAY_YEAR_SLASH, DATE_MONTH_NAME_DAY_YEAR, INVOICE_DATE,
};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Produces the raw date substring; normalization happens in [`normalize_date`].
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        INVOICE_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let date = caps.name("date")?;
                Some(
                    ExtractionMatch::new(date.as_str().to_string(), &caps[0])
                        .with_position(date.start(), date.end()),
                )
            })
            .collect()
    }
}

/// Alternate layouts tried when a date is not already canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `March 5, 2024`
    MonthNameDayYear,
    /// `03/05/2024` (month first)
    MonthDayYearSlash,
    /// `5. März 2024`
    DayMonthNameYear,
    /// `5.3.2024`
    DayMonthYearDotted,
}

impl DateLayout {
    /// Layouts in the order they are tried.
    pub const ORDER: [DateLayout; 4] = [
        Self::MonthNameDayYear,
        Self::MonthDayYearSlash,
        Self::DayMonthNameYear,
        Self::DayMonthYearDotted,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::MonthNameDayYear => &DATE_MONTH_NAME_DAY_YEAR,
            Self::MonthDayYearSlash => &DATE_MONTH_DAY_YEAR_SLASH,
            Self::DayMonthNameYear => &DATE_DAY_MONTH_NAME_YEAR,
            Self::DayMonthYearDotted => &DATE_DAY_MONTH_YEAR_DOTTED,
        }
    }

    fn month(&self, caps: &Captures<'_>) -> Option<u32> {
        let month = caps.name("month")?.as_str();
        match self {
            Self::MonthNameDayYear | Self::DayMonthNameYear => month_from_name(month),
            Self::MonthDayYearSlash | Self::DayMonthYearDotted => month.parse().ok(),
        }
    }

    /// Parse a date in this layout, rejecting impossible calendar dates.
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let caps = self.pattern().captures(s)?;
        let day: u32 = caps.name("day")?.as_str().parse().ok()?;
        let year: i32 = caps.name("year")?.as_str().parse().ok()?;
        let month = self.month(&caps)?;

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Normalize a matched date substring to `DD.MM.YYYY`.
///
/// Strings already in that shape are returned unchanged, even when the day
/// does not exist in the given month.
pub fn normalize_date(raw: &str) -> Result<String, ExtractionError> {
    let raw = raw.trim();

    if CANONICAL_DATE.is_match(raw) {
        return Ok(raw.to_string());
    }

    DateLayout::ORDER
        .iter()
        .find_map(|layout| {
            let date = layout.parse(raw)?;
            trace!("Parsed date {:?} with layout {:?}", raw, layout);
            Some(date.format("%d.%m.%Y").to_string())
        })
        .ok_or_else(|| ExtractionError::InvalidDateFormat(raw.to_string()))
}

fn month_from_name(month: &str) -> Option<u32> {
    let month = match month.to_lowercase().as_str() {
        "january" | "januar" | "jänner" => 1,
        "february" | "februar" => 2,
        "march" | "märz" | "maerz" => 3,
        "april" => 4,
        "may" | "mai" => 5,
        "june" | "juni" => 6,
        "july" | "juli" => 7,
        "august" => 8,
        "september" => 9,
        "october" | "oktober" => 10,
        "november" => 11,
        "december" | "dezember" => 12,
        _ => return None,
    };
    Some(month)
}
