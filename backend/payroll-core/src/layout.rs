// src/layout.rs

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::PayrollError;

// --- Layout Constants (the convention of the current schedule workbooks) ---

pub const NAME_MARKER: &str = "NAME:";
pub const ORIGIN_MARKER: &str = "From:";
pub const HEADER_TOKENS: [&str; 3] = ["Schedule", "DATE", "SERVICE"];
pub const WINDOW_WIDTH: usize = 9;
pub const WINDOW_STARTS: [(Weekday, usize); 7] = [
    (Weekday::Sun, 1),
    (Weekday::Mon, 10),
    (Weekday::Tue, 19),
    (Weekday::Wed, 28),
    (Weekday::Thu, 37),
    (Weekday::Fri, 46),
    (Weekday::Sat, 55),
];

/// One day-of-week column group inside a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub day: Weekday,
    pub start: usize,
}

/// Offsets of each appointment sub-field, relative to the first column of a day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowFields {
    pub client: usize,
    pub date: usize,
    pub service: usize,
    pub tip: usize,
    pub product: usize,
    pub payment_method: usize,
    pub payment_reference: usize,
    pub verified: usize,
}

impl Default for WindowFields {
    fn default() -> Self {
        Self {
            client: 0,
            date: 1,
            service: 2,
            tip: 3,
            product: 4,
            payment_method: 5,
            payment_reference: 6,
            verified: 7,
        }
    }
}

impl WindowFields {
    fn named(&self) -> [(&'static str, usize); 8] {
        [
            ("client", self.client),
            ("date", self.date),
            ("service", self.service),
            ("tip", self.tip),
            ("product", self.product),
            ("payment_method", self.payment_method),
            ("payment_reference", self.payment_reference),
            ("verified", self.verified),
        ]
    }
}

/// Declarative description of a week tab: where the employee announcement lives,
/// how the header row is recognised and where each day's appointment fields sit.
///
/// Offsets for the announcement are relative to the cell holding `name_marker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub name_marker: String,
    pub name_offset: usize,
    pub category_offset: usize,
    pub origin_marker: String,
    pub origin_marker_offset: usize,
    pub origin_offset: usize,
    pub header_tokens: Vec<String>,
    pub window_width: usize,
    pub day_windows: Vec<DayWindow>,
    pub fields: WindowFields,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            name_marker: NAME_MARKER.to_string(),
            name_offset: 1,
            category_offset: 3,
            origin_marker: ORIGIN_MARKER.to_string(),
            origin_marker_offset: 4,
            origin_offset: 5,
            header_tokens: HEADER_TOKENS.iter().map(|t| t.to_string()).collect(),
            window_width: WINDOW_WIDTH,
            day_windows: WINDOW_STARTS
                .iter()
                .map(|&(day, start)| DayWindow { day, start })
                .collect(),
            fields: WindowFields::default(),
        }
    }
}

impl SheetLayout {
    pub fn from_json_file(path: &Path) -> Result<Self, PayrollError> {
        let json_string = fs::read_to_string(path)?;
        let layout: SheetLayout = serde_json::from_str(&json_string)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Column span covered by a day window.
    pub fn window_span(&self, window: &DayWindow) -> Range<usize> {
        window.start..window.start + self.window_width
    }

    /// Rejects layouts that would make windows read each other's cells.
    pub fn validate(&self) -> Result<(), PayrollError> {
        if self.name_marker.trim().is_empty() {
            return Err(PayrollError::InvalidLayout(
                "name marker must not be blank".to_string(),
            ));
        }
        if self.header_tokens.is_empty() {
            return Err(PayrollError::InvalidLayout(
                "at least one header token is required".to_string(),
            ));
        }
        if self.window_width == 0 {
            return Err(PayrollError::InvalidLayout(
                "window width must be positive".to_string(),
            ));
        }
        if self.day_windows.is_empty() {
            return Err(PayrollError::InvalidLayout(
                "at least one day window is required".to_string(),
            ));
        }

        for (field, offset) in self.fields.named() {
            if offset >= self.window_width {
                return Err(PayrollError::InvalidLayout(format!(
                    "field '{}' at offset {} falls outside the {}-column window",
                    field, offset, self.window_width
                )));
            }
        }

        let mut seen_days = HashSet::new();
        for window in &self.day_windows {
            if !seen_days.insert(window.day) {
                return Err(PayrollError::InvalidLayout(format!(
                    "day {} has more than one window",
                    window.day
                )));
            }
        }

        let mut spans: Vec<Range<usize>> = self
            .day_windows
            .iter()
            .map(|w| self.window_span(w))
            .collect();
        spans.sort_by_key(|span| span.start);
        for pair in spans.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(PayrollError::InvalidLayout(format!(
                    "windows starting at columns {} and {} overlap",
                    pair[0].start, pair[1].start
                )));
            }
        }

        Ok(())
    }
}
