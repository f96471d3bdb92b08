// src/records.rs

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::model::ServiceRecord;

/// Which weeks, employees and categories to keep. An empty list does not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub weeks: Vec<String>,
    pub employees: Vec<String>,
    pub categories: Vec<String>,
}

fn admits(selected: &[String], value: &str) -> bool {
    selected.is_empty() || selected.iter().any(|s| s == value)
}

impl FilterSelection {
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        admits(&self.weeks, &record.week)
            && admits(&self.employees, &record.employee)
            && admits(&self.categories, record.category.as_str())
    }

    /// The week, when exactly one is selected.
    pub fn single_week(&self) -> Option<&str> {
        match self.weeks.as_slice() {
            [week] => Some(week.as_str()),
            _ => None,
        }
    }

    /// The (employee, week) pair, when exactly one of each is selected.
    pub fn single_employee_week(&self) -> Option<(&str, &str)> {
        match (self.employees.as_slice(), self.weeks.as_slice()) {
            ([employee], [week]) => Some((employee.as_str(), week.as_str())),
            _ => None,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// The combined record table of every source in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    records: Vec<ServiceRecord>,
}

impl RecordSet {
    /// Concatenates per-source batches, dropping records without an employee name and
    /// records whose client is on the stoplist.
    pub fn assemble<I>(batches: I, config: &Config) -> Self
    where
        I: IntoIterator<Item = Vec<ServiceRecord>>,
    {
        let mut records = Vec::new();
        let mut dropped = 0usize;
        for batch in batches {
            for record in batch {
                if record.employee.trim().is_empty() || config.is_invalid_client(&record.client) {
                    dropped += 1;
                    continue;
                }
                records.push(record);
            }
        }
        info!(
            "Assembled {} records ({} dropped without an employee or with a stoplisted client)",
            records.len(),
            dropped
        );
        Self { records }
    }

    pub fn from_records(records: Vec<ServiceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn weeks(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.week.as_str()))
    }

    pub fn employees(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.employee.as_str()))
    }

    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    pub fn filtered(&self, selection: &FilterSelection) -> RecordSet {
        RecordSet {
            records: self
                .records
                .iter()
                .filter(|r| selection.matches(r))
                .cloned()
                .collect(),
        }
    }

    pub fn completed(&self) -> Vec<ServiceRecord> {
        self.records.iter().filter(|r| r.completed).cloned().collect()
    }

    /// Booked appointments with a client that were not delivered.
    pub fn not_completed(&self) -> Vec<ServiceRecord> {
        self.records
            .iter()
            .filter(|r| !r.completed && !r.client.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::{NaiveDate, Weekday};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(employee: &str, week: &str, category: Category, client: &str, completed: bool) -> ServiceRecord {
        ServiceRecord {
            week: week.to_string(),
            employee: employee.to_string(),
            category,
            origin: None,
            day: Weekday::Wed,
            date: NaiveDate::from_ymd_opt(2024, 3, 6),
            client: client.to_string(),
            service: if completed { dec!(100) } else { Decimal::ZERO },
            tip: Decimal::ZERO,
            product: Decimal::ZERO,
            payment_method: None,
            payment_reference: None,
            verified: false,
            completed,
        }
    }

    #[test]
    fn assembly_drops_nameless_and_stoplisted_records() {
        let config = Config::default();
        let first = vec![
            record("Ana", "WEEK 1", Category::Employee, "Joan", true),
            record("  ", "WEEK 1", Category::Employee, "Rita", true),
        ];
        let second = vec![record("Bea", "WEEK 2", Category::Training, "off", false)];

        let set = RecordSet::assemble(vec![first, second], &config);

        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].employee, "Ana");
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let set = RecordSet::from_records(vec![
            record("Bea", "WEEK 2", Category::Training, "A", true),
            record("Ana", "WEEK 1", Category::Employee, "B", true),
            record("Bea", "WEEK 1", Category::Training, "C", true),
        ]);

        assert_eq!(set.weeks(), vec!["WEEK 2", "WEEK 1"]);
        assert_eq!(set.employees(), vec!["Bea", "Ana"]);
        assert_eq!(set.categories(), vec!["Training", "Employee"]);
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let set = RecordSet::from_records(vec![
            record("Ana", "WEEK 1", Category::Employee, "A", true),
            record("Bea", "WEEK 2", Category::Training, "B", false),
        ]);

        assert_eq!(set.filtered(&FilterSelection::default()), set);
    }

    #[test]
    fn selection_combines_weeks_employees_and_categories() {
        let set = RecordSet::from_records(vec![
            record("Ana", "WEEK 1", Category::Employee, "A", true),
            record("Ana", "WEEK 2", Category::Employee, "B", true),
            record("Bea", "WEEK 1", Category::Training, "C", true),
            record("Bea", "WEEK 1", Category::Employee, "D", true),
        ]);
        let selection = FilterSelection {
            weeks: vec!["WEEK 1".to_string()],
            employees: vec![],
            categories: vec!["Employee".to_string()],
        };

        let clients: Vec<String> = set
            .filtered(&selection)
            .records()
            .iter()
            .map(|r| r.client.clone())
            .collect();

        assert_eq!(clients, vec!["A", "D"]);
    }

    #[test]
    fn partitions_completed_and_not_completed() {
        let set = RecordSet::from_records(vec![
            record("Ana", "WEEK 1", Category::Employee, "A", true),
            record("Ana", "WEEK 1", Category::Employee, "B", false),
        ]);

        assert_eq!(set.completed().len(), 1);
        assert_eq!(set.not_completed().len(), 1);
        assert_eq!(set.not_completed()[0].client, "B");
    }

    #[test]
    fn single_selections() {
        let selection = FilterSelection {
            weeks: vec!["WEEK 1".to_string()],
            employees: vec!["Ana".to_string()],
            categories: vec![],
        };
        assert_eq!(selection.single_week(), Some("WEEK 1"));
        assert_eq!(selection.single_employee_week(), Some(("Ana", "WEEK 1")));
        assert_eq!(FilterSelection::default().single_week(), None);
    }
}
