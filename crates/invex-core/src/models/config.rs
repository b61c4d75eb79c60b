//! Configuration structures for the extraction pipeline.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InvexError, Result};

/// Main configuration for invex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Record output configuration.
    pub output: OutputConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Euro per US dollar, applied to amounts found next to a `$` sign.
    pub usd_to_eur_rate: Decimal,

    /// Tax rate in percent assumed for euro invoices that state none.
    pub default_tax_rate: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            usd_to_eur_rate: Decimal::new(93, 2),
            default_tax_rate: Decimal::from(19),
        }
    }
}

/// Record output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON records.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| InvexError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
