// src/documents.rs

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;

use crate::dashboard::Dashboard;
use crate::model::Category;
use crate::payment::RecordPayment;

/// `$1,234.56` style amount with a leading `-` for negatives.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let raw = format!("{:.2}", rounded.abs());
    let (whole, cents) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{}", sign, grouped, cents)
}

fn date_range(paid: &[&RecordPayment]) -> Option<String> {
    let dates = paid.iter().filter_map(|p| p.record.date);
    let first = dates.clone().min()?;
    let last = dates.max()?;
    Some(format!(
        "{} to {}",
        first.format("%m/%d/%y"),
        last.format("%m/%d/%y")
    ))
}

// --- General Report ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub employee: String,
    pub category: Category,
    pub services: Decimal,
    pub tips: Decimal,
    pub payment: Decimal,
    pub profit: Decimal,
    pub appointments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralReport {
    pub generated_at: NaiveDateTime,
    pub completed: usize,
    pub not_completed: usize,
    pub total_services: Decimal,
    pub total_tips: Decimal,
    pub company_profit: Decimal,
    pub lines: Vec<ReportLine>,
}

impl GeneralReport {
    /// Totals per (employee, category) over the individually paid appointments.
    pub fn compose(dashboard: &Dashboard, generated_at: NaiveDateTime) -> Self {
        let mut lines: Vec<ReportLine> = Vec::new();
        for paid in &dashboard.paid {
            let record = &paid.record;
            let idx = match lines
                .iter()
                .position(|l| l.employee == record.employee && l.category == record.category)
            {
                Some(idx) => idx,
                None => {
                    lines.push(ReportLine {
                        employee: record.employee.clone(),
                        category: record.category.clone(),
                        services: Decimal::ZERO,
                        tips: Decimal::ZERO,
                        payment: Decimal::ZERO,
                        profit: Decimal::ZERO,
                        appointments: 0,
                    });
                    lines.len() - 1
                }
            };
            let line = &mut lines[idx];
            line.services += record.service;
            line.tips += record.tip;
            line.payment += paid.split.employee_payment;
            line.profit += paid.split.company_profit;
            line.appointments += 1;
        }
        lines.sort_by(|a, b| {
            a.employee
                .cmp(&b.employee)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });

        let metrics = &dashboard.metrics;
        Self {
            generated_at,
            completed: metrics.completed,
            not_completed: metrics.not_completed,
            total_services: metrics.total_services,
            total_tips: metrics.total_tips,
            company_profit: metrics.company_profit,
            lines,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "FINANCIAL ANALYSIS REPORT");
        let _ = writeln!(out, "Generated on: {}", self.generated_at.format("%d/%m/%Y %H:%M"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Completed Appointments: {}", self.completed);
        let _ = writeln!(out, "Not Completed: {}", self.not_completed);
        let _ = writeln!(out, "Total Services: {}", format_currency(self.total_services));
        let _ = writeln!(out, "Total Tips: {}", format_currency(self.total_tips));
        let _ = writeln!(out, "Company Profit: {}", format_currency(self.company_profit));
        let _ = writeln!(out);
        let _ = writeln!(out, "Summary per Employee");
        let _ = writeln!(
            out,
            "{:<15} {:<12} {:>12} {:>12} {:>12} {:>12}",
            "Employee", "Category", "Services", "Tips", "Payment", "Profit"
        );
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{:<15} {:<12} {:>12} {:>12} {:>12} {:>12}",
                line.employee.chars().take(15).collect::<String>(),
                line.category.as_str().chars().take(12).collect::<String>(),
                format_currency(line.services),
                format_currency(line.tips),
                format_currency(line.payment),
                format_currency(line.profit)
            );
        }
        out
    }
}

// --- Payment Receipt ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub employee: String,
    pub week: String,
    pub reference: String,
    pub issued_on: NaiveDate,
    pub appointments: usize,
    pub total_services: Decimal,
    pub total_tips: Decimal,
    pub total_payment: Decimal,
}

impl PaymentReceipt {
    /// `None` when the employee has no completed appointment in that week.
    pub fn compose(
        dashboard: &Dashboard,
        employee: &str,
        week: &str,
        issued_on: NaiveDate,
    ) -> Option<Self> {
        let paid = dashboard.paid_for(employee, week);
        let reference = date_range(&paid)?;
        Some(Self {
            employee: employee.to_string(),
            week: week.to_string(),
            reference,
            issued_on,
            appointments: paid.len(),
            total_services: paid.iter().map(|p| p.record.service).sum(),
            total_tips: paid.iter().map(|p| p.record.tip).sum(),
            total_payment: paid.iter().map(|p| p.split.employee_payment).sum(),
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "EMPLOYEE PAYMENT RECEIPT");
        let _ = writeln!(out);
        let _ = writeln!(out, "Employee: {}", self.employee);
        let _ = writeln!(out, "Reference: {}", self.reference);
        let _ = writeln!(out, "Issue Date: {}", self.issued_on.format("%m/%d/%Y"));
        let _ = writeln!(out);
        let _ = writeln!(out, "SUMMARY OF SERVICES");
        let _ = writeln!(out, "{:<24}{:>16}", "Total Appointments:", self.appointments);
        let _ = writeln!(out, "{:<24}{:>16}", "Total in Services:", format_currency(self.total_services));
        let _ = writeln!(out, "{:<24}{:>16}", "Total in Tips:", format_currency(self.total_tips));
        let _ = writeln!(out, "{:<24}{:>16}", "Total Payment:", format_currency(self.total_payment));
        let _ = writeln!(out);
        let _ = writeln!(out, "This receipt was generated automatically.");
        out
    }
}

// --- Recognition Certificate ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionCertificate {
    pub employee: String,
    pub week: String,
    pub reference: String,
    pub issued_on: NaiveDate,
}

impl RecognitionCertificate {
    pub fn compose(
        dashboard: &Dashboard,
        employee: &str,
        week: &str,
        issued_on: NaiveDate,
    ) -> Option<Self> {
        let reference = date_range(&dashboard.paid_for(employee, week))?;
        Some(Self {
            employee: employee.to_string(),
            week: week.to_string(),
            reference,
            issued_on,
        })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "You have performed excellent services and have been recognized as:");
        let _ = writeln!(out, "EMPLOYEE OF THE WEEK");
        let _ = writeln!(out, "Congratulations on your outstanding performance!");
        let _ = writeln!(out);
        let _ = writeln!(out, "Employee: {}", self.employee);
        let _ = writeln!(out, "Reference: {}", self.reference);
        let _ = writeln!(out, "Issue Date: {}", self.issued_on.format("%m/%d/%Y"));
        let _ = writeln!(out);
        let _ = writeln!(out, "This certificate was generated automatically.");
        out
    }
}
