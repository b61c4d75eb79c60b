//! Data models for invoice records and configuration.

pub mod config;
pub mod record;
