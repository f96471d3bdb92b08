// src/sheet.rs

use calamine::{Data, Range};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use std::fmt;

// Text date formats accepted in the date column, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

// Excel serial 1 is 1900-01-01; counting from 1899-12-30 absorbs the 1900 leap-year bug.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

static EMPTY: Cell = Cell::Empty;

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(dt) => write!(f, "{}", dt),
        }
    }
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Trimmed textual value, `None` for blank cells.
    pub fn text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        let text = self.to_string();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Cell::Text(s) => s.contains(needle),
            Cell::Empty => false,
            other => other.to_string().contains(needle),
        }
    }

    /// Monetary value of the cell. Anything that is not a finite number is `None`.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Cell::Number(n) if n.is_finite() => Decimal::from_f64(*n),
            Cell::Text(s) => parse_amount(s),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(dt) => Some(dt.date()),
            Cell::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
            Cell::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Verification marks are free-form; anything filled in that is not an explicit "no" counts.
    pub fn flag(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n != 0.0 && !n.is_nan(),
            Cell::Date(_) => true,
            Cell::Text(s) => {
                let s = s.trim().to_lowercase();
                !(s.is_empty() || matches!(s.as_str(), "no" | "n" | "false" | "0" | "nan"))
            }
        }
    }
}

fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = Decimal::from_str(text) {
        return Some(value);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Decimal::from_f64(value),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_EXCEL_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
                .map(Cell::Date)
                .unwrap_or(Cell::Number(dt.as_f64())),
            Data::DateTimeIso(s) => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(Cell::Date)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// One week tab, read with no header row. Row and column indices are absolute sheet positions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Builds a sheet from a decoded range, padding so that indices stay absolute
    /// even when the used range does not start at A1.
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        rows.extend(range.rows().map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(Cell::from));
            cells
        }));
        Self::new(name, rows)
    }
}

/// Out-of-range reads behave like empty cells.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}

/// Row contents joined into one string, for substring searches that may span cells.
pub fn row_text(row: &[Cell]) -> String {
    row.iter()
        .filter(|c| !c.is_blank())
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_parse_numbers_and_numeric_text() {
        assert_eq!(Cell::Number(120.0).amount(), Some(dec!(120)));
        assert_eq!(Cell::Text(" 85.50 ".into()).amount(), Some(dec!(85.50)));
        assert_eq!(Cell::Text("1e2".into()).amount(), Some(dec!(100)));
    }

    #[test]
    fn non_numeric_amounts_are_missing() {
        assert_eq!(Cell::Text("paid later".into()).amount(), None);
        assert_eq!(Cell::Text("nan".into()).amount(), None);
        assert_eq!(Cell::Text("inf".into()).amount(), None);
        assert_eq!(Cell::Number(f64::NAN).amount(), None);
        assert_eq!(Cell::Bool(true).amount(), None);
        assert_eq!(Cell::Empty.amount(), None);
    }

    #[test]
    fn dates_from_serials_and_text() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(Cell::Number(45355.0).date(), Some(expected));
        assert_eq!(Cell::Text("2024-03-04".into()).date(), Some(expected));
        assert_eq!(Cell::Text("03/04/2024".into()).date(), Some(expected));
        assert_eq!(Cell::Text("2024-03-04 10:30:00".into()).date(), Some(expected));
        assert_eq!(Cell::Text("someday".into()).date(), None);
        assert_eq!(Cell::Empty.date(), None);
    }

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Cell::Number(1234.0).text(), Some("1234".to_string()));
        assert_eq!(Cell::Number(12.5).text(), Some("12.5".to_string()));
        assert_eq!(Cell::Text("   ".into()).text(), None);
    }

    #[test]
    fn verification_flags() {
        assert!(Cell::Text("OK".into()).flag());
        assert!(Cell::Bool(true).flag());
        assert!(Cell::Number(1.0).flag());
        assert!(!Cell::Text("no".into()).flag());
        assert!(!Cell::Empty.flag());
    }

    #[test]
    fn row_text_spans_cells() {
        let row = vec![
            Cell::Empty,
            Cell::Text("Schedule".into()),
            Cell::Text("DATE".into()),
            Cell::Number(3.0),
        ];
        assert_eq!(row_text(&row), "Schedule DATE 3");
        assert_eq!(cell_at(&row, 99), &Cell::Empty);
    }
}
