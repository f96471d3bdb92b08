// src/dashboard.rs

use serde::Serialize;
use tracing::info;

use crate::aggregate::weekly_totals;
use crate::config::Config;
use crate::model::ServiceRecord;
use crate::payment::{distribute, settle_weeks, RecordPayment, WeeklyPayment};
use crate::records::{FilterSelection, RecordSet};
use crate::summary::{
    employee_summaries, payment_method_summary, week_highlights, EmployeeSummary,
    HeadlineMetrics, PaymentMethodSummary, WeekHighlights,
};

/// Every derived table for one filter selection. Built from scratch on each call;
/// nothing is cached between selections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub selection: FilterSelection,
    pub records: RecordSet,
    pub weekly: Vec<WeeklyPayment>,
    pub paid: Vec<RecordPayment>,
    pub not_completed: Vec<ServiceRecord>,
    pub metrics: HeadlineMetrics,
    pub employees: Vec<EmployeeSummary>,
    pub payment_methods: Vec<PaymentMethodSummary>,
    pub highlights: Option<WeekHighlights>,
}

impl Dashboard {
    pub fn compute(all_records: &RecordSet, selection: &FilterSelection, config: &Config) -> Self {
        let records = all_records.filtered(selection);
        let completed = records.completed();
        let not_completed = records.not_completed();

        let weekly = settle_weeks(weekly_totals(&completed));
        let paid = distribute(&completed, &weekly);
        let metrics = HeadlineMetrics::compute(&paid, &not_completed);
        let employees = employee_summaries(&weekly);
        let payment_methods = payment_method_summary(&completed, config);
        let highlights = selection
            .single_week()
            .and_then(|week| week_highlights(&completed, week));

        info!(
            "Dashboard: {} records, {} weekly aggregates, {} completed, {} not completed",
            records.len(),
            weekly.len(),
            metrics.completed,
            metrics.not_completed
        );

        Self {
            selection: selection.clone(),
            records,
            weekly,
            paid,
            not_completed,
            metrics,
            employees,
            payment_methods,
            highlights,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Completed, paid appointments of one employee in one week.
    pub fn paid_for(&self, employee: &str, week: &str) -> Vec<&RecordPayment> {
        self.paid
            .iter()
            .filter(|p| p.record.employee == employee && p.record.week == week)
            .collect()
    }
}
