//! Revenue time series for the dashboard chart. Buckets track order
//! value by issue date; payment state plays no part here.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::ServiceOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Granularity::Daily),
            "monthly" => Some(Granularity::Monthly),
            "yearly" => Some(Granularity::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

/// Parallel label/value sequences, index-aligned and equal in length.
#[derive(Debug, Serialize)]
pub struct RevenueSeries {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

/// Bucket orders by issue date and sum their totals per bucket. `today`
/// is injected so the series is deterministic under test.
///
/// - daily: 31 buckets, today minus 30 days through today
/// - monthly: 12 buckets ending in the current month
/// - yearly: 5 buckets ending in the current year
pub fn revenue_series(
    orders: &[ServiceOrder],
    granularity: Granularity,
    today: NaiveDate,
) -> RevenueSeries {
    let mut labels = Vec::new();
    let mut values = Vec::new();

    match granularity {
        Granularity::Daily => {
            for offset in 0..=30 {
                let day = today - Duration::days(30 - offset);
                labels.push(day.format("%d/%m").to_string());
                values.push(
                    orders
                        .iter()
                        .filter(|o| o.issue_date == day)
                        .map(|o| o.total)
                        .sum(),
                );
            }
        }
        Granularity::Monthly => {
            for back in (0..12).rev() {
                let (year, month) = months_back(today.year(), today.month(), back);
                let first = NaiveDate::from_ymd_opt(year, month, 1)
                    .unwrap_or(today);
                labels.push(first.format("%b/%y").to_string());
                values.push(
                    orders
                        .iter()
                        .filter(|o| o.issue_date.year() == year && o.issue_date.month() == month)
                        .map(|o| o.total)
                        .sum(),
                );
            }
        }
        Granularity::Yearly => {
            for year in (today.year() - 4)..=today.year() {
                labels.push(year.to_string());
                values.push(
                    orders
                        .iter()
                        .filter(|o| o.issue_date.year() == year)
                        .map(|o| o.total)
                        .sum(),
                );
            }
        }
    }

    RevenueSeries { labels, values }
}

/// Calendar month `back` months before (year, month).
fn months_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let idx = year * 12 + month as i32 - 1 - back as i32;
    (idx.div_euclid(12), (idx.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Address, Client, ServiceItem, ServiceOrder};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn order_on(issue: NaiveDate, value: Decimal) -> ServiceOrder {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut order = ServiceOrder {
            id: format!("o-{issue}"),
            number: "00001".to_string(),
            reference: "ref".to_string(),
            issue_date: issue,
            delivery_date: issue + Duration::days(30),
            total: Decimal::ZERO,
            created_at: stamp,
            updated_at: stamp,
            client: Client {
                name: "Acme".to_string(),
                tax_id: "1".to_string(),
                phone: "2".to_string(),
                email: "a@b.c".to_string(),
                address: Address {
                    street: "s".to_string(),
                    number: "1".to_string(),
                    complement: None,
                    district: "d".to_string(),
                    city: "c".to_string(),
                    state: "SP".to_string(),
                    postal_code: "0".to_string(),
                },
            },
            items: vec![ServiceItem::new("item".to_string(), 1, value)],
        };
        order.recompute_total();
        order
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_series_has_31_aligned_entries() {
        let today = date(2024, 1, 15);
        let series = revenue_series(&[], Granularity::Daily, today);
        assert_eq!(series.labels.len(), 31);
        assert_eq!(series.values.len(), 31);
        assert_eq!(series.labels[0], "16/12");
        assert_eq!(series.labels[30], "15/01");
        assert!(series.values.iter().all(|v| *v == Decimal::ZERO));
    }

    #[test]
    fn daily_buckets_sum_same_day_orders() {
        let today = date(2024, 1, 15);
        let orders = vec![
            order_on(date(2024, 1, 10), dec!(100.00)),
            order_on(date(2024, 1, 10), dec!(50.00)),
            order_on(date(2024, 1, 12), dec!(25.00)),
        ];
        let series = revenue_series(&orders, Granularity::Daily, today);

        let idx_10 = series.labels.iter().position(|l| l == "10/01").unwrap();
        let idx_11 = series.labels.iter().position(|l| l == "11/01").unwrap();
        let idx_12 = series.labels.iter().position(|l| l == "12/01").unwrap();
        assert_eq!(series.values[idx_10], dec!(150.00));
        assert_eq!(series.values[idx_11], Decimal::ZERO);
        assert_eq!(series.values[idx_12], dec!(25.00));
    }

    #[test]
    fn daily_excludes_orders_outside_the_window() {
        let today = date(2024, 1, 15);
        let orders = vec![
            order_on(date(2023, 12, 15), dec!(10.00)), // 31 days back
            order_on(date(2023, 12, 16), dec!(20.00)), // oldest bucket
            order_on(date(2024, 1, 16), dec!(30.00)),  // tomorrow
        ];
        let series = revenue_series(&orders, Granularity::Daily, today);
        assert_eq!(series.values.iter().sum::<Decimal>(), dec!(20.00));
    }

    #[test]
    fn monthly_series_spans_twelve_months_across_year_boundary() {
        let today = date(2024, 3, 20);
        let orders = vec![
            order_on(date(2023, 4, 1), dec!(10.00)),  // first bucket
            order_on(date(2023, 12, 31), dec!(40.00)),
            order_on(date(2024, 3, 1), dec!(70.00)),  // current month
            order_on(date(2023, 3, 31), dec!(99.00)), // too old
        ];
        let series = revenue_series(&orders, Granularity::Monthly, today);

        assert_eq!(series.labels.len(), 12);
        assert_eq!(series.labels[0], "Apr/23");
        assert_eq!(series.labels[11], "Mar/24");
        assert_eq!(series.values[0], dec!(10.00));
        assert_eq!(series.values[8], dec!(40.00)); // Dec/23
        assert_eq!(series.values[11], dec!(70.00));
        assert_eq!(series.values.iter().sum::<Decimal>(), dec!(120.00));
    }

    #[test]
    fn yearly_series_spans_five_years() {
        let today = date(2024, 6, 1);
        let orders = vec![
            order_on(date(2020, 1, 1), dec!(5.00)),
            order_on(date(2024, 12, 31), dec!(15.00)),
            order_on(date(2019, 12, 31), dec!(99.00)), // too old
        ];
        let series = revenue_series(&orders, Granularity::Yearly, today);

        assert_eq!(series.labels, vec!["2020", "2021", "2022", "2023", "2024"]);
        assert_eq!(series.values[0], dec!(5.00));
        assert_eq!(series.values[4], dec!(15.00));
    }

    #[test]
    fn granularity_parse_round_trips() {
        assert_eq!(Granularity::parse("daily"), Some(Granularity::Daily));
        assert_eq!(Granularity::parse("monthly"), Some(Granularity::Monthly));
        assert_eq!(Granularity::parse("yearly"), Some(Granularity::Yearly));
        assert_eq!(Granularity::parse("weekly"), None);
    }
}
