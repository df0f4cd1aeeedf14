use approx::assert_relative_eq;
use chrono::NaiveDate;
use proptest::prelude::*;
use sales_forecast::aggregate::{aggregate_daily, DailyRecord, DailySeries};
use sales_forecast::data::TransactionRow;
use sales_forecast::ForecastError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(day: NaiveDate, amount: f64, quantity: u32, discount: f64, id: &str) -> TransactionRow {
    TransactionRow::new(day, amount, quantity, discount, id)
}

#[test]
fn test_aggregate_daily_totals() {
    let rows = vec![
        row(date(2023, 1, 2), 30.0, 3, 10.0, "T3"),
        row(date(2023, 1, 1), 100.0, 2, 0.0, "T1"),
        row(date(2023, 1, 2), 20.0, 1, 20.0, "T4"),
        row(date(2023, 1, 1), 50.0, 1, 10.0, "T2"),
    ];

    let series = aggregate_daily(&rows).unwrap();
    let records = series.records();

    assert_eq!(series.len(), 2);
    assert_eq!(records[0].date, date(2023, 1, 1));
    assert_eq!(records[0].total_sales, 150.0);
    assert_eq!(records[0].total_quantity, 3);
    assert_eq!(records[0].num_transactions, 2);
    assert_relative_eq!(records[0].avg_discount, 5.0);

    assert_eq!(records[1].date, date(2023, 1, 2));
    assert_eq!(records[1].total_sales, 50.0);
    assert_eq!(records[1].total_quantity, 4);
    assert_eq!(records[1].num_transactions, 2);
    assert_relative_eq!(records[1].avg_discount, 15.0);
}

#[test]
fn test_aggregate_does_not_fill_gaps() {
    let rows = vec![
        row(date(2023, 1, 1), 10.0, 1, 0.0, "T1"),
        row(date(2023, 1, 5), 10.0, 1, 0.0, "T2"),
    ];

    let series = aggregate_daily(&rows).unwrap();

    assert_eq!(series.dates(), vec![date(2023, 1, 1), date(2023, 1, 5)]);
    assert_eq!(series.first_date(), Some(date(2023, 1, 1)));
    assert_eq!(series.last_date(), Some(date(2023, 1, 5)));
}

#[test]
fn test_aggregate_empty_input() {
    let result = aggregate_daily(&[]);
    assert!(matches!(result, Err(ForecastError::InvalidInput(_))));
}

#[test]
fn test_aggregate_rejects_invalid_rows() {
    let rows = vec![row(date(2023, 1, 1), -1.0, 1, 0.0, "T1")];
    assert!(matches!(aggregate_daily(&rows), Err(ForecastError::InvalidInput(_))));
}

#[test]
fn test_daily_series_requires_ascending_dates() {
    let record = |day| DailyRecord {
        date: day,
        total_sales: 1.0,
        total_quantity: 1,
        num_transactions: 1,
        avg_discount: 0.0,
    };

    let unordered = DailySeries::from_records(vec![record(date(2023, 1, 2)), record(date(2023, 1, 1))]);
    assert!(matches!(unordered, Err(ForecastError::InvalidInput(_))));

    let repeated = DailySeries::from_records(vec![record(date(2023, 1, 1)), record(date(2023, 1, 1))]);
    assert!(repeated.is_err());

    assert!(DailySeries::from_records(Vec::new()).is_err());
}

#[test]
fn test_daily_series_deserialization_is_checked() {
    let record = |day: u32| DailyRecord {
        date: date(2023, 1, day),
        total_sales: day as f64,
        total_quantity: 1,
        num_transactions: 1,
        avg_discount: 0.0,
    };

    let series = DailySeries::from_records(vec![record(1), record(2)]).unwrap();
    let json = serde_json::to_string(&series).unwrap();
    assert_eq!(serde_json::from_str::<DailySeries>(&json).unwrap(), series);

    let unordered = serde_json::to_string(&vec![record(2), record(1)]).unwrap();
    assert!(serde_json::from_str::<DailySeries>(&unordered).is_err());
    assert!(serde_json::from_str::<DailySeries>("[]").is_err());
}

fn transactions() -> impl Strategy<Value = Vec<TransactionRow>> {
    prop::collection::vec((0u32..60, 0u32..10_000, 0u32..20, 0u32..=100), 1..120).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (offset, cents, quantity, discount))| {
                let day = date(2023, 1, 1) + chrono::Days::new(u64::from(offset));
                row(day, f64::from(cents), quantity, f64::from(discount), &format!("T{}", i))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_aggregation_ignores_row_order(
        (rows, shuffled) in transactions().prop_flat_map(|rows| {
            let shuffled = Just(rows.clone()).prop_shuffle();
            (Just(rows), shuffled)
        })
    ) {
        let a = aggregate_daily(&rows).unwrap();
        let b = aggregate_daily(&shuffled).unwrap();

        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.records().iter().zip(b.records()) {
            prop_assert_eq!(x.date, y.date);
            prop_assert_eq!(x.total_sales, y.total_sales);
            prop_assert_eq!(x.total_quantity, y.total_quantity);
            prop_assert_eq!(x.num_transactions, y.num_transactions);
            prop_assert!((x.avg_discount - y.avg_discount).abs() < 1e-9);
        }
        prop_assert!(a.records().windows(2).all(|w| w[0].date < w[1].date));
        prop_assert_eq!(
            a.records().iter().map(|r| r.num_transactions).sum::<usize>(),
            rows.len()
        );
    }
}
