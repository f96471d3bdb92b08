// src/payment_tests.rs

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::aggregate::{weekly_totals, WeeklyTotals};
    use crate::model::{Category, ServiceRecord};
    use crate::payment::{
        distribute, settle_weeks, weekly_split, AllocationBasis, PaymentSplit, WeeklyPayment,
    };

    fn tolerance() -> Decimal {
        dec!(0.000001)
    }

    fn completed(employee: &str, week: &str, category: Category, service: Decimal, tip: Decimal) -> ServiceRecord {
        ServiceRecord {
            week: week.to_string(),
            employee: employee.to_string(),
            category,
            origin: None,
            day: Weekday::Tue,
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            client: "Client".to_string(),
            service,
            tip,
            product: Decimal::ZERO,
            payment_method: Some("Cash".to_string()),
            payment_reference: None,
            verified: true,
            completed: true,
        }
    }

    fn weekly(employee: &str, week: &str, category: Category, service: Decimal, tips: Decimal, days: u32) -> WeeklyPayment {
        let totals = WeeklyTotals {
            employee: employee.to_string(),
            week: week.to_string(),
            category,
            service,
            tips,
            days_worked: days,
            appointments: 1,
        };
        settle_weeks(vec![totals]).remove(0)
    }

    // --- Weekly formulas ---

    #[test]
    fn registering_pays_nothing() {
        let split = weekly_split(&Category::Registering, dec!(400), dec!(40), 4);
        assert_eq!(split, PaymentSplit::unpaid(dec!(440)));
    }

    #[test]
    fn employee_gets_twenty_percent_plus_tips() {
        for (service, tips) in [(dec!(0), dec!(0)), (dec!(1234.56), dec!(78.90)), (dec!(50), dec!(0))] {
            let split = weekly_split(&Category::Employee, service, tips, 3);
            assert_eq!(split.employee_payment, dec!(0.20) * service + tips);
            assert_eq!(split.company_profit, dec!(0.80) * service);
        }
    }

    #[test]
    fn training_pays_a_day_rate() {
        let split = weekly_split(&Category::Training, dec!(500), dec!(50), 3);
        assert_eq!(split.employee_payment, dec!(240));
        assert_eq!(split.company_profit, dec!(310));
    }

    #[test]
    fn coordinator_profit_ignores_tips() {
        let split = weekly_split(&Category::Coordinator, dec!(1000), dec!(100), 5);
        assert_eq!(split.employee_payment, dec!(350));
        assert_eq!(split.company_profit, dec!(750));
    }

    #[test]
    fn started_takes_the_larger_of_minimum_and_commission() {
        // Minimum wins: 150 * 3 = 450 > 0.2 * 1000 + 100 = 300
        let split = weekly_split(&Category::Started, dec!(1000), dec!(100), 3);
        assert_eq!(split.employee_payment, dec!(450));
        assert_eq!(split.company_profit, dec!(650));

        // Commission wins: 0.2 * 3000 + 200 = 800 > 150 * 2 = 300
        let split = weekly_split(&Category::Started, dec!(3000), dec!(200), 2);
        assert_eq!(split.employee_payment, dec!(800));
        assert_eq!(split.company_profit, dec!(2400));

        for (service, tips, days) in [(dec!(0), dec!(0), 0u32), (dec!(720), dec!(15), 5), (dec!(99.99), dec!(1), 1)] {
            let split = weekly_split(&Category::Started, service, tips, days);
            let expected = (dec!(150) * Decimal::from(days)).max(dec!(0.20) * service + tips);
            assert_eq!(split.employee_payment, expected);
        }
    }

    #[test]
    fn unknown_category_pays_nothing() {
        let split = weekly_split(&Category::Other("Intern".to_string()), dec!(300), dec!(30), 2);
        assert_eq!(split.employee_payment, Decimal::ZERO);
        assert_eq!(split.company_profit, dec!(330));
    }

    #[test]
    fn miscased_label_falls_back_to_unpaid() {
        let category = Category::parse("employee");
        assert_eq!(category, Category::Other("employee".to_string()));

        let split = weekly_split(&category, dec!(1000), dec!(100), 3);
        assert_eq!(split, PaymentSplit::unpaid(dec!(1100)));
    }

    // --- Redistribution ---

    #[test]
    fn individual_payments_sum_to_the_weekly_payment() {
        let records = vec![
            completed("Ana", "WEEK 1", Category::Employee, dec!(100), dec!(10)),
            completed("Ana", "WEEK 1", Category::Employee, dec!(33.33), dec!(0)),
            completed("Ana", "WEEK 1", Category::Employee, dec!(66.67), dec!(5)),
        ];
        let weekly = settle_weeks(weekly_totals(&records));
        let pool = weekly[0].split.employee_payment;

        let paid = distribute(&records, &weekly);

        let total: Decimal = paid.iter().map(|p| p.split.employee_payment).sum();
        assert!((total - pool).abs() < tolerance(), "{} vs {}", total, pool);
        assert!(paid.iter().all(|p| p.basis == AllocationBasis::Proportional));
    }

    #[test]
    fn every_record_splits_its_own_gross() {
        let records = vec![
            completed("Ana", "WEEK 1", Category::Started, dec!(120), dec!(12)),
            completed("Ana", "WEEK 1", Category::Started, dec!(80), dec!(0)),
            completed("Bea", "WEEK 1", Category::Training, dec!(300), dec!(30)),
        ];
        let weekly = settle_weeks(weekly_totals(&records));

        for paid in distribute(&records, &weekly) {
            assert_eq!(
                paid.split.employee_payment + paid.split.company_profit,
                paid.record.service + paid.record.tip
            );
        }
    }

    #[test]
    fn proportional_share_follows_service_value() {
        let records = vec![
            completed("Bea", "WEEK 2", Category::Training, dec!(300), dec!(0)),
            completed("Bea", "WEEK 2", Category::Training, dec!(100), dec!(20)),
        ];
        // One distinct date: the pool is 80.
        let weekly = settle_weeks(weekly_totals(&records));
        assert_eq!(weekly[0].split.employee_payment, dec!(80));

        let paid = distribute(&records, &weekly);

        assert_eq!(paid[0].split.employee_payment, dec!(60));
        assert_eq!(paid[0].split.company_profit, dec!(240));
        assert_eq!(paid[1].split.employee_payment, dec!(20));
        assert_eq!(paid[1].split.company_profit, dec!(100));
    }

    #[test]
    fn zero_weekly_service_leaves_everything_to_the_company() {
        let records = vec![
            completed("Ana", "WEEK 1", Category::Training, dec!(0), dec!(15)),
            completed("Ana", "WEEK 1", Category::Training, dec!(0), dec!(0)),
        ];
        let weekly = settle_weeks(weekly_totals(&records));
        // Training still earns its day rate at the weekly level.
        assert_eq!(weekly[0].split.employee_payment, dec!(80));

        let paid = distribute(&records, &weekly);

        for p in &paid {
            assert_eq!(p.basis, AllocationBasis::ZeroWeeklyService);
            assert_eq!(p.split.employee_payment, Decimal::ZERO);
            assert_eq!(p.split.company_profit, p.record.service + p.record.tip);
        }
    }

    #[test]
    fn record_without_weekly_aggregate_is_unpaid() {
        let records = vec![completed("Ana", "WEEK 9", Category::Employee, dec!(100), dec!(10))];
        let weekly = vec![weekly("Ana", "WEEK 1", Category::Employee, dec!(100), dec!(10), 1)];

        let paid = distribute(&records, &weekly);

        assert_eq!(paid[0].basis, AllocationBasis::NoWeeklyAggregate);
        assert_eq!(paid[0].split, PaymentSplit::unpaid(dec!(110)));
    }

    #[test]
    fn not_completed_records_are_not_distributed() {
        let mut booked = completed("Ana", "WEEK 1", Category::Employee, dec!(0), dec!(0));
        booked.completed = false;

        assert!(distribute(&[booked], &[]).is_empty());
    }

    // Known reconciliation gap: weekly Employee/Coordinator profit is a flat share of service,
    // while per-appointment profit is a residual. The residuals add back up for a single
    // category, but an individual appointment's profit is not the flat share of its service.
    #[test]
    fn coordinator_per_record_profit_is_a_residual_not_a_flat_share() {
        let records = vec![
            completed("Cai", "WEEK 1", Category::Coordinator, dec!(600), dec!(100)),
            completed("Cai", "WEEK 1", Category::Coordinator, dec!(400), dec!(0)),
        ];
        let weekly = settle_weeks(weekly_totals(&records));
        assert_eq!(weekly[0].split.company_profit, dec!(750));

        let paid = distribute(&records, &weekly);

        // Pool 350: 60% and 40% of it.
        assert_eq!(paid[0].split.employee_payment, dec!(210));
        assert_eq!(paid[0].split.company_profit, dec!(490));
        assert_ne!(paid[0].split.company_profit, dec!(0.75) * dec!(600));
        assert_eq!(paid[1].split.company_profit, dec!(260));
        assert_ne!(paid[1].split.company_profit, dec!(0.75) * dec!(400));

        let record_profit: Decimal = paid.iter().map(|p| p.split.company_profit).sum();
        assert_eq!(record_profit, weekly[0].split.company_profit);
    }

    // Known reconciliation gap: an employee booked under two categories in one week is paid
    // from the first category's pool, spread over the service of both.
    #[test]
    fn mixed_categories_in_a_week_share_the_first_pool() {
        let records = vec![
            completed("Ana", "WEEK 1", Category::Employee, dec!(100), dec!(0)),
            completed("Ana", "WEEK 1", Category::Coordinator, dec!(100), dec!(0)),
        ];
        let weekly = settle_weeks(weekly_totals(&records));
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].split.employee_payment, dec!(20));
        assert_eq!(weekly[1].split.employee_payment, dec!(25));

        let paid = distribute(&records, &weekly);

        assert_eq!(paid[0].split.employee_payment, dec!(10));
        assert_eq!(paid[1].split.employee_payment, dec!(10));
        let weekly_profit: Decimal = weekly.iter().map(|w| w.split.company_profit).sum();
        let record_profit: Decimal = paid.iter().map(|p| p.split.company_profit).sum();
        assert_ne!(weekly_profit, record_profit);
    }
}
