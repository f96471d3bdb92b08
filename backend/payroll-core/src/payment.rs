// src/payment.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::aggregate::WeeklyTotals;
use crate::model::{Category, ServiceRecord};

// --- Compensation Rules ---

const EMPLOYEE_COMMISSION: Decimal = dec!(0.20);
const EMPLOYEE_COMPANY_SHARE: Decimal = dec!(0.80);
const COORDINATOR_COMMISSION: Decimal = dec!(0.25);
const COORDINATOR_COMPANY_SHARE: Decimal = dec!(0.75);
const STARTED_COMMISSION: Decimal = dec!(0.20);
const TRAINING_DAY_RATE: Decimal = dec!(80);
const STARTED_DAY_MINIMUM: Decimal = dec!(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PaymentSplit {
    pub employee_payment: Decimal,
    pub company_profit: Decimal,
}

impl PaymentSplit {
    /// Everything goes to the company.
    pub fn unpaid(gross: Decimal) -> Self {
        Self {
            employee_payment: Decimal::ZERO,
            company_profit: gross,
        }
    }
}

/// Weekly payment for one (employee, week, category) aggregate.
///
/// Employee and Coordinator profit is a flat share of the service amount, so their tips pass
/// straight through to the employee without touching the company's share. Every other category
/// books the remainder of service + tips as profit. Unknown categories pay nothing.
pub fn weekly_split(
    category: &Category,
    service: Decimal,
    tips: Decimal,
    days_worked: u32,
) -> PaymentSplit {
    let gross = service + tips;
    let days = Decimal::from(days_worked);

    match category {
        Category::Registering => PaymentSplit::unpaid(gross),
        Category::Employee => PaymentSplit {
            employee_payment: service * EMPLOYEE_COMMISSION + tips,
            company_profit: service * EMPLOYEE_COMPANY_SHARE,
        },
        Category::Training => {
            let employee_payment = TRAINING_DAY_RATE * days;
            PaymentSplit {
                employee_payment,
                company_profit: gross - employee_payment,
            }
        }
        Category::Coordinator => PaymentSplit {
            employee_payment: service * COORDINATOR_COMMISSION + tips,
            company_profit: service * COORDINATOR_COMPANY_SHARE,
        },
        Category::Started => {
            let commission = service * STARTED_COMMISSION + tips;
            let minimum = STARTED_DAY_MINIMUM * days;
            let employee_payment = commission.max(minimum);
            PaymentSplit {
                employee_payment,
                company_profit: gross - employee_payment,
            }
        }
        Category::Other(label) => {
            debug!("No payment rule for category '{}'", label);
            PaymentSplit::unpaid(gross)
        }
    }
}

// --- Weekly Allocation ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPayment {
    #[serde(flatten)]
    pub totals: WeeklyTotals,
    #[serde(flatten)]
    pub split: PaymentSplit,
}

pub fn settle_weeks(totals: Vec<WeeklyTotals>) -> Vec<WeeklyPayment> {
    totals
        .into_iter()
        .map(|totals| {
            let split = weekly_split(
                &totals.category,
                totals.service,
                totals.tips,
                totals.days_worked,
            );
            WeeklyPayment { totals, split }
        })
        .collect()
}

// --- Per-Appointment Redistribution ---

/// How a record's share of the weekly payment was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllocationBasis {
    Proportional,
    NoWeeklyAggregate,
    ZeroWeeklyService,
    ArithmeticFault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPayment {
    #[serde(flatten)]
    pub record: ServiceRecord,
    #[serde(flatten)]
    pub split: PaymentSplit,
    pub basis: AllocationBasis,
}

// Payment pool of one (employee, week): the first aggregate's payment and the service
// total across all of that employee's aggregates for the week.
#[derive(Debug, Clone, Copy)]
struct WeekPool {
    employee_payment: Decimal,
    service: Decimal,
}

fn week_pools(weekly: &[WeeklyPayment]) -> HashMap<(&str, &str), WeekPool> {
    let mut pools: HashMap<(&str, &str), WeekPool> = HashMap::new();
    for week in weekly {
        let key = (week.totals.employee.as_str(), week.totals.week.as_str());
        pools
            .entry(key)
            .and_modify(|pool| pool.service += week.totals.service)
            .or_insert(WeekPool {
                employee_payment: week.split.employee_payment,
                service: week.totals.service,
            });
    }
    pools
}

fn proportional_split(record: &ServiceRecord, pool: Option<&WeekPool>) -> (PaymentSplit, AllocationBasis) {
    let gross = record.gross();
    let Some(pool) = pool else {
        return (PaymentSplit::unpaid(gross), AllocationBasis::NoWeeklyAggregate);
    };
    if pool.service.is_zero() {
        return (PaymentSplit::unpaid(gross), AllocationBasis::ZeroWeeklyService);
    }

    let split = record
        .service
        .checked_div(pool.service)
        .and_then(|share| share.checked_mul(pool.employee_payment))
        .and_then(|employee_payment| {
            record
                .service
                .checked_add(record.tip)?
                .checked_sub(employee_payment)
                .map(|company_profit| PaymentSplit {
                    employee_payment,
                    company_profit,
                })
        });

    match split {
        Some(split) => (split, AllocationBasis::Proportional),
        None => {
            warn!(
                "Arithmetic fault splitting payment for {} / {} ({})",
                record.employee, record.week, record.client
            );
            (PaymentSplit::unpaid(gross), AllocationBasis::ArithmeticFault)
        }
    }
}

/// Attributes each employee's weekly payment to their completed appointments in proportion
/// to each appointment's share of the week's service amount. Company profit per appointment
/// is whatever remains of its service + tip.
///
/// Per appointment, Employee and Coordinator profit is therefore a residual rather than the
/// flat 80% / 75% share used at the weekly level.
pub fn distribute(completed: &[ServiceRecord], weekly: &[WeeklyPayment]) -> Vec<RecordPayment> {
    let pools = week_pools(weekly);
    completed
        .iter()
        .filter(|r| r.completed)
        .map(|record| {
            let pool = pools.get(&(record.employee.as_str(), record.week.as_str()));
            let (split, basis) = proportional_split(record, pool);
            RecordPayment {
                record: record.clone(),
                split,
                basis,
            }
        })
        .collect()
}
