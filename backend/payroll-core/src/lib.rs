// src/lib.rs

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod documents;
pub mod error;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod payment;
pub mod records;
pub mod sheet;
pub mod source;
pub mod summary;

#[cfg(test)]
mod payment_tests;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{PayrollError, SourceError};
pub use records::{FilterSelection, RecordSet};
pub use source::{SourceLoader, WorkbookSource};
