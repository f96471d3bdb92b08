// src/summary.rs

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::config::Config;
use crate::model::{Category, ServiceRecord};
use crate::payment::{RecordPayment, WeeklyPayment};

// --- Headline Metrics ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub completed: usize,
    pub not_completed: usize,
    pub total_services: Decimal,
    pub total_tips: Decimal,
    pub company_profit: Decimal,
}

impl HeadlineMetrics {
    pub fn compute(paid: &[RecordPayment], not_completed: &[ServiceRecord]) -> Self {
        Self {
            completed: paid.len(),
            not_completed: not_completed.len(),
            total_services: paid.iter().map(|p| p.record.service).sum(),
            total_tips: paid.iter().map(|p| p.record.tip).sum(),
            company_profit: paid.iter().map(|p| p.split.company_profit).sum(),
        }
    }
}

// --- Per-Employee Summary ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee: String,
    pub category: Category,
    pub total_services: Decimal,
    pub total_tips: Decimal,
    pub total_payment: Decimal,
    pub company_profit: Decimal,
    pub appointments: u32,
    pub days_worked: u32,
    pub average_service: Decimal,
    pub average_tip: Decimal,
}

fn per_appointment(total: Decimal, appointments: u32) -> Decimal {
    if appointments == 0 {
        return Decimal::ZERO;
    }
    total
        .checked_div(Decimal::from(appointments))
        .unwrap_or(Decimal::ZERO)
}

/// Sums weekly aggregates per (employee, category), busiest employees first.
pub fn employee_summaries(weekly: &[WeeklyPayment]) -> Vec<EmployeeSummary> {
    let mut summaries: Vec<EmployeeSummary> = Vec::new();

    for week in weekly {
        let totals = &week.totals;
        let slot = summaries
            .iter()
            .position(|s| s.employee == totals.employee && s.category == totals.category);
        let summary = match slot {
            Some(idx) => &mut summaries[idx],
            None => {
                summaries.push(EmployeeSummary {
                    employee: totals.employee.clone(),
                    category: totals.category.clone(),
                    total_services: Decimal::ZERO,
                    total_tips: Decimal::ZERO,
                    total_payment: Decimal::ZERO,
                    company_profit: Decimal::ZERO,
                    appointments: 0,
                    days_worked: 0,
                    average_service: Decimal::ZERO,
                    average_tip: Decimal::ZERO,
                });
                let last = summaries.len() - 1;
                &mut summaries[last]
            }
        };
        summary.total_services += totals.service;
        summary.total_tips += totals.tips;
        summary.total_payment += week.split.employee_payment;
        summary.company_profit += week.split.company_profit;
        summary.appointments += totals.appointments;
        summary.days_worked += totals.days_worked;
    }

    for summary in &mut summaries {
        summary.average_service = per_appointment(summary.total_services, summary.appointments);
        summary.average_tip = per_appointment(summary.total_tips, summary.appointments);
    }
    summaries.sort_by(|a, b| b.appointments.cmp(&a.appointments));
    summaries
}

// --- Payment Methods ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodSummary {
    pub method: String,
    pub services: Decimal,
    pub tips: Decimal,
    pub usage_count: u32,
    pub total: Decimal,
    pub usage_percentage: Decimal,
}

/// Usage and takings per payment method, over completed records with a valid method.
pub fn payment_method_summary(completed: &[ServiceRecord], config: &Config) -> Vec<PaymentMethodSummary> {
    let mut summaries: Vec<PaymentMethodSummary> = Vec::new();

    for record in completed.iter().filter(|r| r.completed) {
        let Some(method) = record
            .payment_method
            .as_deref()
            .filter(|m| config.is_valid_payment_method(m))
        else {
            continue;
        };
        let idx = match summaries.iter().position(|s| s.method == method) {
            Some(idx) => idx,
            None => {
                summaries.push(PaymentMethodSummary {
                    method: method.to_string(),
                    services: Decimal::ZERO,
                    tips: Decimal::ZERO,
                    usage_count: 0,
                    total: Decimal::ZERO,
                    usage_percentage: Decimal::ZERO,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[idx];
        summary.services += record.service;
        summary.tips += record.tip;
        summary.usage_count += 1;
    }

    let uses: u32 = summaries.iter().map(|s| s.usage_count).sum();
    for summary in &mut summaries {
        summary.total = summary.services + summary.tips;
        summary.usage_percentage = (Decimal::from(summary.usage_count) * dec!(100))
            .checked_div(Decimal::from(uses))
            .unwrap_or(Decimal::ZERO)
            .round_dp(2);
    }
    summaries.sort_by(|a, b| a.method.cmp(&b.method));
    summaries
}

// --- Week Highlights ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeHighlight {
    pub employee: String,
    pub appointments: u32,
    /// Percentage above (or below) the average number of appointments.
    pub productivity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekHighlights {
    pub week: String,
    pub average_appointments: Decimal,
    pub top: EmployeeHighlight,
    pub lowest: EmployeeHighlight,
}

/// Employee of the week and lowest productivity, by completed appointments in `week`.
/// Ties go to whoever appears first.
pub fn week_highlights(completed: &[ServiceRecord], week: &str) -> Option<WeekHighlights> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for record in completed.iter().filter(|r| r.completed && r.week == week) {
        match counts.iter_mut().find(|(name, _)| *name == record.employee) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.employee.clone(), 1)),
        }
    }
    if counts.is_empty() {
        return None;
    }

    let total: u32 = counts.iter().map(|(_, c)| c).sum();
    let average = Decimal::from(total) / Decimal::from(counts.len() as u64);

    let highlight = |(name, count): &(String, u32)| EmployeeHighlight {
        employee: name.clone(),
        appointments: *count,
        productivity: ((Decimal::from(*count) / average - Decimal::ONE) * dec!(100)).round_dp(1),
    };

    let mut top = &counts[0];
    let mut lowest = &counts[0];
    for entry in &counts[1..] {
        if entry.1 > top.1 {
            top = entry;
        }
        if entry.1 < lowest.1 {
            lowest = entry;
        }
    }

    Some(WeekHighlights {
        week: week.to_string(),
        average_appointments: average.round_dp(2),
        top: highlight(top),
        lowest: highlight(lowest),
    })
}
