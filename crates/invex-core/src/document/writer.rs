use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::record::InvoiceRecord;

/// Persists an extracted record.
pub trait RecordWriter {
    /// Write the record, returning where it went.
    fn write(&self, record: &InvoiceRecord) -> Result<PathBuf>;
}

/// Writes records as JSON files.
#[derive(Debug, Clone)]
pub struct JsonRecordWriter {
    path: PathBuf,
    pretty: bool,
}

impl JsonRecordWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize a record the way this writer stores it.
    pub fn to_json(&self, record: &InvoiceRecord) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        Ok(json)
    }
}

impl RecordWriter for JsonRecordWriter {
    fn write(&self, record: &InvoiceRecord) -> Result<PathBuf> {
        let json = self.to_json(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;

        info!("Wrote invoice record to {}", self.path.display());
        Ok(self.path.clone())
    }
}
