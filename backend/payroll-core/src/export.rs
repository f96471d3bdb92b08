// src/export.rs

use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::info;

use crate::error::PayrollError;
use crate::model::{weekday_label, ServiceRecord};
use crate::payment::WeeklyPayment;

// csv cannot serialize flattened structs, so each table gets its own row shape.

#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    week: &'a str,
    employee: &'a str,
    category: &'a str,
    origin: Option<&'a str>,
    day: &'static str,
    date: Option<String>,
    client: &'a str,
    service: Decimal,
    tip: Decimal,
    product: Decimal,
    payment_method: Option<&'a str>,
    payment_reference: Option<&'a str>,
    verified: bool,
    completed: bool,
}

impl<'a> From<&'a ServiceRecord> for RecordRow<'a> {
    fn from(r: &'a ServiceRecord) -> Self {
        Self {
            week: &r.week,
            employee: &r.employee,
            category: r.category.as_str(),
            origin: r.origin.as_deref(),
            day: weekday_label(r.day),
            date: r.date.map(|d| d.format("%Y-%m-%d").to_string()),
            client: &r.client,
            service: r.service,
            tip: r.tip,
            product: r.product,
            payment_method: r.payment_method.as_deref(),
            payment_reference: r.payment_reference.as_deref(),
            verified: r.verified,
            completed: r.completed,
        }
    }
}

#[derive(Debug, Serialize)]
struct WeeklyRow<'a> {
    employee: &'a str,
    week: &'a str,
    category: &'a str,
    service: Decimal,
    tips: Decimal,
    days_worked: u32,
    appointments: u32,
    employee_payment: Decimal,
    company_profit: Decimal,
}

impl<'a> From<&'a WeeklyPayment> for WeeklyRow<'a> {
    fn from(w: &'a WeeklyPayment) -> Self {
        Self {
            employee: &w.totals.employee,
            week: &w.totals.week,
            category: w.totals.category.as_str(),
            service: w.totals.service,
            tips: w.totals.tips,
            days_worked: w.totals.days_worked,
            appointments: w.totals.appointments,
            employee_payment: w.split.employee_payment,
            company_profit: w.split.company_profit,
        }
    }
}

pub fn write_records<W: io::Write>(records: &[ServiceRecord], out: W) -> Result<(), PayrollError> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(RecordRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_weekly<W: io::Write>(weekly: &[WeeklyPayment], out: W) -> Result<(), PayrollError> {
    let mut writer = csv::Writer::from_writer(out);
    for week in weekly {
        writer.serialize(WeeklyRow::from(week))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_records(records: &[ServiceRecord], path: &Path) -> Result<(), PayrollError> {
    write_records(records, std::fs::File::create(path)?)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn export_weekly(weekly: &[WeeklyPayment], path: &Path) -> Result<(), PayrollError> {
    write_weekly(weekly, std::fs::File::create(path)?)?;
    info!("Wrote {} weekly rows to {}", weekly.len(), path.display());
    Ok(())
}
