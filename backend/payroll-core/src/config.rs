// src/config.rs

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::PayrollError;
use crate::layout::SheetLayout;

// --- Defaults ---

pub const DEFAULT_WEEK_PREFIX: &str = "WEEK";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VALID_PAYMENT_METHODS: [&str; 7] =
    ["Cash", "Card", "Check", "Zelle", "Venmo", "Cash App", "PayPal"];
pub const DEFAULT_INVALID_CLIENTS: [&str; 12] = [
    "OFF",
    "DAY OFF",
    "CANCELED",
    "CANCELLED",
    "NO SHOW",
    "HOLIDAY",
    "N/A",
    "NA",
    "NAN",
    "NONE",
    "-",
    "X",
];

fn default_week_prefix() -> String {
    DEFAULT_WEEK_PREFIX.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_valid_payment_methods() -> Vec<String> {
    DEFAULT_VALID_PAYMENT_METHODS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_invalid_clients() -> Vec<String> {
    DEFAULT_INVALID_CLIENTS.iter().map(|c| c.to_string()).collect()
}

/// Run configuration. Read from `PAYROLL_*` environment variables (a `.env` file is honoured);
/// list values are comma separated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_week_prefix")]
    pub week_prefix: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_valid_payment_methods")]
    pub valid_payment_methods: Vec<String>,
    #[serde(default = "default_invalid_clients")]
    pub invalid_clients: Vec<String>,
    #[serde(default)]
    pub layout_file: Option<PathBuf>,
    #[serde(skip)]
    pub layout: SheetLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_prefix: default_week_prefix(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            valid_payment_methods: default_valid_payment_methods(),
            invalid_clients: default_invalid_clients(),
            layout_file: None,
            layout: SheetLayout::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, PayrollError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let mut config = envy::prefixed("PAYROLL_").from_env::<Config>()?;
        if let Some(path) = &config.layout_file {
            info!("Loading sheet layout from {}", path.display());
            config.layout = SheetLayout::from_json_file(path)?;
        }
        config.layout.validate()?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn is_week_sheet(&self, sheet_name: &str) -> bool {
        sheet_name.starts_with(&self.week_prefix)
    }

    /// Case-insensitive, whitespace-trimmed stoplist match.
    pub fn is_invalid_client(&self, client: &str) -> bool {
        let client = client.trim().to_uppercase();
        self.invalid_clients
            .iter()
            .any(|c| c.trim().to_uppercase() == client)
    }

    pub fn is_valid_payment_method(&self, method: &str) -> bool {
        let method = method.trim();
        self.valid_payment_methods.iter().any(|m| m == method)
    }
}
