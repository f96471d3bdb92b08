// src/aggregate.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::model::{Category, ServiceRecord};

/// Per (employee, week, category) rollup of completed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTotals {
    pub employee: String,
    pub week: String,
    pub category: Category,
    pub service: Decimal,
    pub tips: Decimal,
    /// Distinct service dates of the employee in that week, across all of their categories.
    pub days_worked: u32,
    pub appointments: u32,
}

/// Groups completed records by (employee, week, category), in first-seen order.
/// Not-completed records in the input are ignored.
pub fn weekly_totals(records: &[ServiceRecord]) -> Vec<WeeklyTotals> {
    let mut dates: HashMap<(&str, &str), HashSet<Option<NaiveDate>>> = HashMap::new();
    let mut index: HashMap<(&str, &str, &Category), usize> = HashMap::new();
    let mut totals: Vec<WeeklyTotals> = Vec::new();

    for record in records.iter().filter(|r| r.completed) {
        dates
            .entry((record.employee.as_str(), record.week.as_str()))
            .or_default()
            .insert(record.date);

        let key = (
            record.employee.as_str(),
            record.week.as_str(),
            &record.category,
        );
        let slot = *index.entry(key).or_insert_with(|| {
            totals.push(WeeklyTotals {
                employee: record.employee.clone(),
                week: record.week.clone(),
                category: record.category.clone(),
                service: Decimal::ZERO,
                tips: Decimal::ZERO,
                days_worked: 0,
                appointments: 0,
            });
            totals.len() - 1
        });

        let group = &mut totals[slot];
        group.service += record.service;
        group.tips += record.tip;
        group.appointments += 1;
    }

    for group in &mut totals {
        group.days_worked = dates
            .get(&(group.employee.as_str(), group.week.as_str()))
            .map(|d| d.len() as u32)
            .unwrap_or(0);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    fn record(employee: &str, week: &str, category: Category, date: &str, service: Decimal) -> ServiceRecord {
        ServiceRecord {
            week: week.to_string(),
            employee: employee.to_string(),
            category,
            origin: None,
            day: Weekday::Mon,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            client: "Client".to_string(),
            service,
            tip: dec!(5),
            product: Decimal::ZERO,
            payment_method: None,
            payment_reference: None,
            verified: false,
            completed: true,
        }
    }

    #[test]
    fn groups_sum_amounts_and_count_distinct_days() {
        let records = vec![
            record("Ana", "WEEK 1", Category::Employee, "2024-03-04", dec!(100)),
            record("Ana", "WEEK 1", Category::Employee, "2024-03-04", dec!(50)),
            record("Ana", "WEEK 1", Category::Employee, "2024-03-05", dec!(70)),
            record("Bea", "WEEK 1", Category::Training, "2024-03-04", dec!(90)),
        ];

        let totals = weekly_totals(&records);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].employee, "Ana");
        assert_eq!(totals[0].service, dec!(220));
        assert_eq!(totals[0].tips, dec!(15));
        assert_eq!(totals[0].appointments, 3);
        assert_eq!(totals[0].days_worked, 2);
        assert_eq!(totals[1].employee, "Bea");
        assert_eq!(totals[1].days_worked, 1);
    }

    #[test]
    fn days_worked_spans_categories_of_the_same_week() {
        let records = vec![
            record("Ana", "WEEK 1", Category::Training, "2024-03-04", dec!(100)),
            record("Ana", "WEEK 1", Category::Started, "2024-03-06", dec!(100)),
        ];

        let totals = weekly_totals(&records);

        assert_eq!(totals.len(), 2);
        assert!(totals.iter().all(|t| t.days_worked == 2));
        assert!(totals.iter().all(|t| t.appointments == 1));
    }

    #[test]
    fn not_completed_records_are_ignored() {
        let mut booked = record("Ana", "WEEK 1", Category::Employee, "2024-03-04", Decimal::ZERO);
        booked.completed = false;

        assert!(weekly_totals(&[booked]).is_empty());
    }
}
