// src/source.rs

use async_trait::async_trait;
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Reader};
use reqwest::Client;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::Config;
use crate::error::{PayrollError, SourceError};
use crate::sheet::RawSheet;

/// Where a workbook comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkbookSource {
    Path(PathBuf),
    /// An uploaded file already held in memory.
    Bytes { label: String, data: Bytes },
    Url(Url),
}

impl WorkbookSource {
    /// `http://` and `https://` arguments become URL sources, everything else a file path.
    pub fn parse(arg: &str) -> Result<Self, PayrollError> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Ok(WorkbookSource::Url(Url::parse(arg)?))
        } else {
            Ok(WorkbookSource::Path(PathBuf::from(arg)))
        }
    }

    pub fn label(&self) -> String {
        match self {
            WorkbookSource::Path(path) => path.display().to_string(),
            WorkbookSource::Bytes { label, .. } => label.clone(),
            WorkbookSource::Url(url) => url.to_string(),
        }
    }
}

impl fmt::Display for WorkbookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// --- Fetching ---

#[async_trait]
pub trait FetchBytes: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Bytes, PayrollError>;
}

pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, PayrollError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl FetchBytes for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, PayrollError> {
        debug!("Fetching workbook from {}", url);
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        info!("Received response from {}: Status={}", url, status);

        if !status.is_success() {
            return Err(PayrollError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}

// --- Decoding ---

/// Decodes an xlsx/xls/ods workbook and returns its week tabs, in workbook order.
pub fn decode_workbook(data: Bytes, config: &Config) -> Result<Vec<RawSheet>, PayrollError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        if !config.is_week_sheet(&name) {
            debug!("Ignoring tab '{}'", name);
            continue;
        }
        let range = workbook.worksheet_range(&name)?;
        sheets.push(RawSheet::from_range(&name, &range));
    }
    Ok(sheets)
}

// --- Loading ---

pub struct SourceLoader<'a, F: FetchBytes> {
    fetcher: F,
    config: &'a Config,
}

impl<'a> SourceLoader<'a, HttpFetcher> {
    /// Loader that fetches URLs over HTTP with the configured timeout.
    pub fn http(config: &'a Config) -> Result<Self, PayrollError> {
        Ok(Self::new(HttpFetcher::new(config.fetch_timeout())?, config))
    }
}

impl<'a, F: FetchBytes> SourceLoader<'a, F> {
    pub fn new(fetcher: F, config: &'a Config) -> Self {
        Self { fetcher, config }
    }

    pub async fn read_bytes(&self, source: &WorkbookSource) -> Result<Bytes, PayrollError> {
        match source {
            WorkbookSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            WorkbookSource::Bytes { data, .. } => Ok(data.clone()),
            WorkbookSource::Url(url) => self.fetcher.fetch(url).await,
        }
    }

    pub async fn load(&self, source: &WorkbookSource) -> Result<Vec<RawSheet>, PayrollError> {
        let data = self.read_bytes(source).await?;
        debug!("Read {} bytes from {}", data.len(), source);
        let sheets = decode_workbook(data, self.config)?;
        info!("Source '{}': {} week tabs", source, sheets.len());
        Ok(sheets)
    }

    /// Loads every source in order. A failing source is reported and skipped.
    pub async fn load_all(
        &self,
        sources: &[WorkbookSource],
    ) -> (Vec<(WorkbookSource, Vec<RawSheet>)>, Vec<SourceError>) {
        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for source in sources {
            match self.load(source).await {
                Ok(sheets) => loaded.push((source.clone(), sheets)),
                Err(e) => {
                    error!("Failed to load source '{}': {}", source, e);
                    failures.push(SourceError {
                        label: source.label(),
                        error: e,
                    });
                }
            }
        }
        (loaded, failures)
    }
}
