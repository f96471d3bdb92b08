// src/model.rs

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

// --- Compensation Category ---

/// Compensation policy an employee is paid under for a given week.
/// Labels that match none of the known policies are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Registering,
    Employee,
    Training,
    Coordinator,
    Started,
    Other(String),
}

impl Category {
    /// Exact, case-sensitive match. Any other spelling is kept verbatim and pays nothing.
    pub fn parse(label: &str) -> Self {
        match label {
            "Registering" => Category::Registering,
            "Employee" => Category::Employee,
            "Training" => Category::Training,
            "Coordinator" => Category::Coordinator,
            "Started" => Category::Started,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Registering => "Registering",
            Category::Employee => "Employee",
            Category::Training => "Training",
            Category::Coordinator => "Coordinator",
            Category::Started => "Started",
            Category::Other(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_label(*day))
}

// --- Service Record ---

/// One scheduled appointment, taken from one day window of one data row.
///
/// `completed` records carry the amounts found in the sheet. Not-completed records
/// (a client was booked but no service amount was recorded) carry zero amounts and
/// no payment fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub week: String,
    pub employee: String,
    pub category: Category,
    pub origin: Option<String>,
    #[serde(serialize_with = "serialize_weekday")]
    pub day: Weekday,
    /// `None` only while a workbook is being extracted; finalized record sets never hold it.
    pub date: Option<NaiveDate>,
    pub client: String,
    pub service: Decimal,
    pub tip: Decimal,
    pub product: Decimal,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub verified: bool,
    pub completed: bool,
}

impl ServiceRecord {
    /// Service plus tip: the money that is split between employee and company.
    pub fn gross(&self) -> Decimal {
        self.service + self.tip
    }
}
