// src/ingest.rs

use tracing::info;

use crate::config::Config;
use crate::error::SourceError;
use crate::extract::Extractor;
use crate::records::RecordSet;
use crate::source::{FetchBytes, SourceLoader, WorkbookSource};

/// Outcome of one run over all sources.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub records: RecordSet,
    pub failures: Vec<SourceError>,
}

impl IngestReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Loads and extracts every source in order, then assembles one record set.
pub async fn ingest<F: FetchBytes>(
    loader: &SourceLoader<'_, F>,
    config: &Config,
    sources: &[WorkbookSource],
) -> IngestReport {
    let (loaded, failures) = loader.load_all(sources).await;
    let extractor = Extractor::new(config);

    let batches: Vec<_> = loaded
        .iter()
        .map(|(source, sheets)| {
            let records = extractor.extract_workbook(sheets);
            info!("Source '{}': {} records", source, records.len());
            records
        })
        .collect();

    let records = RecordSet::assemble(batches, config);
    info!(
        "Ingested {} records from {} sources ({} failed)",
        records.len(),
        sources.len(),
        failures.len()
    );
    IngestReport { records, failures }
}
