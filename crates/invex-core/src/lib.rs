//! Core library for invoice field scraping.
//!
//! This crate provides:
//! - Document text loading (plain text and PDF)
//! - Pattern-based invoice field matching (number, date, amount block, tax rate, currency)
//! - Amount, tax and date normalization into an [`InvoiceRecord`]
//! - File lookup and JSON record persistence

pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use document::{
    DocumentLoader, DocumentType, FileLocator, FsDocumentLoader, JsonRecordWriter, RecordWriter,
    WalkLocator,
};
pub use error::{ExtractionError, InvexError, LoadError, PdfError, Result};
pub use invoice::{ExtractionResult, InvoiceParser, RuleInvoiceParser};
pub use models::config::InvexConfig;
pub use models::record::{Currency, InvoiceRecord, Money};
pub use pdf::{PdfExtractor, PdfProcessor};
