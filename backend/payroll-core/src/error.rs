// src/error.rs

use thiserror::Error;

// Error type for loading, decoding and exporting payroll data.
// Structural and value faults inside a sheet never end up here; they degrade to "no record".
#[derive(Error, Debug)]
pub enum PayrollError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Source responded with HTTP {status}: {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Workbook could not be decoded: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("CSV export failed: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] envy::Error),

    #[error("Invalid sheet layout: {0}")]
    InvalidLayout(String),
}

/// A failure that wiped out one input source. Other sources of the same run are unaffected.
#[derive(Error, Debug)]
#[error("Source '{label}' produced no data: {error}")]
pub struct SourceError {
    pub label: String,
    #[source]
    pub error: PayrollError,
}
