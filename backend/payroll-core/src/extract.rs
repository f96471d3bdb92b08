// src/extract.rs

use rust_decimal::Decimal;
use std::ops::Range;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::layout::{DayWindow, SheetLayout};
use crate::model::{Category, ServiceRecord};
use crate::sheet::{cell_at, row_text, Cell, RawSheet};

// --- Extraction Outcomes ---

/// Employee announcement read from the marker row of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeInfo {
    pub week: String,
    pub name: String,
    pub category: Category,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlankClient,
    InvalidClient,
}

/// What a single day window of a data row turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Completed(ServiceRecord),
    NotCompleted(ServiceRecord),
    Skipped(SkipReason),
}

impl WindowOutcome {
    pub fn into_record(self) -> Option<ServiceRecord> {
        match self {
            WindowOutcome::Completed(record) | WindowOutcome::NotCompleted(record) => Some(record),
            WindowOutcome::Skipped(_) => None,
        }
    }
}

fn window_cell<'r>(row: &'r [Cell], window: &DayWindow, offset: usize) -> &'r Cell {
    cell_at(row, window.start + offset)
}

// --- Extractor ---

/// Turns week tabs into flat service records following the configured `SheetLayout`.
///
/// Malformed blocks (no announcement cell, no header row) yield nothing and never abort
/// the rest of the sheet.
pub struct Extractor<'a> {
    config: &'a Config,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    fn layout(&self) -> &SheetLayout {
        &self.config.layout
    }

    /// Extracts all week tabs of one workbook, then drops undated and stoplisted records.
    pub fn extract_workbook(&self, sheets: &[RawSheet]) -> Vec<ServiceRecord> {
        let mut records = Vec::new();
        for sheet in sheets {
            if !self.config.is_week_sheet(&sheet.name) {
                debug!("Skipping sheet '{}' (not a week tab)", sheet.name);
                continue;
            }
            records.extend(self.extract_sheet(sheet));
        }
        self.finalize(records)
    }

    pub fn extract_sheet(&self, sheet: &RawSheet) -> Vec<ServiceRecord> {
        let blocks = self.employee_blocks(sheet);
        let mut records = Vec::new();
        for block in &blocks {
            records.extend(self.extract_block(&sheet.name, &sheet.rows[block.clone()]));
        }
        info!(
            "Sheet '{}': {} employee blocks, {} records",
            sheet.name,
            blocks.len(),
            records.len()
        );
        records
    }

    /// Row ranges of each employee block. A block starts at a row announcing an employee
    /// and runs until the next announcement or the end of the sheet; rows before the first
    /// announcement belong to no block.
    pub fn employee_blocks(&self, sheet: &RawSheet) -> Vec<Range<usize>> {
        let marker = &self.layout().name_marker;
        let mut blocks = Vec::new();
        let mut current_start: Option<usize> = None;

        for (idx, row) in sheet.rows.iter().enumerate() {
            if row.iter().any(|cell| cell.contains(marker)) {
                if let Some(start) = current_start {
                    blocks.push(start..idx);
                }
                current_start = Some(idx);
            }
        }
        if let Some(start) = current_start {
            blocks.push(start..sheet.rows.len());
        }
        blocks
    }

    /// Reads name, category and origin relative to the text cell holding the name marker.
    pub fn read_employee(&self, week: &str, block: &[Vec<Cell>]) -> Option<EmployeeInfo> {
        let layout = self.layout();
        let marker = layout.name_marker.as_str();

        let marker_row = block
            .iter()
            .find(|row| row.iter().any(|cell| cell.contains(marker)))?;
        let marker_col = marker_row
            .iter()
            .position(|cell| matches!(cell, Cell::Text(s) if s.contains(marker)))?;

        let name = cell_at(marker_row, marker_col + layout.name_offset)
            .text()
            .unwrap_or_default();
        // Category text is taken as written; only exact labels select a payment rule.
        let category =
            Category::parse(&cell_at(marker_row, marker_col + layout.category_offset).to_string());
        let origin = if cell_at(marker_row, marker_col + layout.origin_marker_offset)
            .contains(&layout.origin_marker)
        {
            cell_at(marker_row, marker_col + layout.origin_offset).text()
        } else {
            None
        };

        Some(EmployeeInfo {
            week: week.to_string(),
            name,
            category,
            origin,
        })
    }

    /// Index of the first row whose joined text contains every header token.
    pub fn find_header_row(&self, block: &[Vec<Cell>]) -> Option<usize> {
        let tokens = &self.layout().header_tokens;
        block.iter().position(|row| {
            let text = row_text(row);
            tokens.iter().all(|token| text.contains(token.as_str()))
        })
    }

    fn extract_block(&self, week: &str, block: &[Vec<Cell>]) -> Vec<ServiceRecord> {
        let Some(employee) = self.read_employee(week, block) else {
            warn!("Sheet '{}': block without a name cell skipped", week);
            return Vec::new();
        };
        let Some(header_idx) = self.find_header_row(block) else {
            warn!(
                "Sheet '{}': no header row for employee '{}', block skipped",
                week, employee.name
            );
            return Vec::new();
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in &block[header_idx + 1..] {
            for window in &self.layout().day_windows {
                match self.extract_window(&employee, row, window).into_record() {
                    Some(record) => records.push(record),
                    None => skipped += 1,
                }
            }
        }
        debug!(
            "Sheet '{}', employee '{}': {} records, {} empty or stoplisted windows",
            week,
            employee.name,
            records.len(),
            skipped
        );
        records
    }

    /// Applies the per-window rules: blank or stoplisted client skips the window, a numeric
    /// service amount makes a completed record, anything else a not-completed one.
    pub fn extract_window(
        &self,
        employee: &EmployeeInfo,
        row: &[Cell],
        window: &DayWindow,
    ) -> WindowOutcome {
        let fields = &self.layout().fields;

        let Some(client) = window_cell(row, window, fields.client).text() else {
            return WindowOutcome::Skipped(SkipReason::BlankClient);
        };
        if self.config.is_invalid_client(&client) {
            return WindowOutcome::Skipped(SkipReason::InvalidClient);
        }

        let booked = ServiceRecord {
            week: employee.week.clone(),
            employee: employee.name.clone(),
            category: employee.category.clone(),
            origin: employee.origin.clone(),
            day: window.day,
            date: window_cell(row, window, fields.date).date(),
            client,
            service: Decimal::ZERO,
            tip: Decimal::ZERO,
            product: Decimal::ZERO,
            payment_method: None,
            payment_reference: None,
            verified: false,
            completed: false,
        };

        match window_cell(row, window, fields.service).amount() {
            Some(service) => WindowOutcome::Completed(ServiceRecord {
                service,
                tip: window_cell(row, window, fields.tip)
                    .amount()
                    .unwrap_or(Decimal::ZERO),
                product: window_cell(row, window, fields.product)
                    .amount()
                    .unwrap_or(Decimal::ZERO),
                payment_method: window_cell(row, window, fields.payment_method)
                    .text()
                    .filter(|method| self.config.is_valid_payment_method(method)),
                payment_reference: window_cell(row, window, fields.payment_reference).text(),
                verified: window_cell(row, window, fields.verified).flag(),
                completed: true,
                ..booked
            }),
            None => WindowOutcome::NotCompleted(booked),
        }
    }

    /// Drops records without a parseable date and re-applies the client stoplist.
    pub fn finalize(&self, records: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
        let total = records.len();
        let kept: Vec<ServiceRecord> = records
            .into_iter()
            .filter(|r| r.date.is_some())
            .filter(|r| !self.config.is_invalid_client(&r.client))
            .collect();
        if kept.len() < total {
            debug!(
                "Dropped {} records without a date or with a stoplisted client",
                total - kept.len()
            );
        }
        kept
    }
}
