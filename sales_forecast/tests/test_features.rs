use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use sales_forecast::aggregate::{DailyRecord, DailySeries};
use sales_forecast::features::{
    build_features, feature_names, CalendarFeatures, FeatureMatrix, FEATURE_NAMES, MAX_LAG,
};
use ndarray::Array2;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Series of `n` consecutive days whose sales equal the day index
fn indexed_series(n: usize) -> DailySeries {
    let start = date(2023, 1, 1);
    let records = (0..n)
        .map(|i| DailyRecord {
            date: start + Days::new(i as u64),
            total_sales: i as f64,
            total_quantity: 2 * i as u64,
            num_transactions: i + 1,
            avg_discount: 5.0,
        })
        .collect();
    DailySeries::from_records(records).unwrap()
}

#[test]
fn test_feature_names_order() {
    assert_eq!(FEATURE_NAMES.len(), 19);
    assert_eq!(FEATURE_NAMES[0], "year");
    assert_eq!(FEATURE_NAMES[3], "day_of_week");
    assert_eq!(FEATURE_NAMES[13], "sales_lag_1");
    assert_eq!(FEATURE_NAMES[18], "trend");
    assert_eq!(feature_names(), FEATURE_NAMES.iter().map(|s| s.to_string()).collect::<Vec<_>>());
}

#[rstest]
#[case(31, 1)]
#[case(40, 10)]
#[case(90, 60)]
#[case(30, 0)]
#[case(10, 0)]
#[case(1, 0)]
fn test_feature_row_count(#[case] days: usize, #[case] expected: usize) {
    let table = build_features(&indexed_series(days)).unwrap();
    assert_eq!(table.len(), expected);
}

#[test]
fn test_lags_and_trend() {
    let table = build_features(&indexed_series(40)).unwrap();

    for row in table.rows() {
        let i = row.trend;
        assert_eq!(row.target, i);
        assert_eq!(row.sales_lag_1, i - 1.0);
        assert_eq!(row.sales_lag_7, i - 7.0);
        assert_eq!(row.sales_lag_30, i - 30.0);
        assert_eq!(row.total_quantity, 2.0 * i);
        assert_eq!(row.num_transactions, i + 1.0);
        assert_eq!(row.avg_discount, 5.0);
    }
    assert_eq!(table.rows()[0].trend, MAX_LAG as f64);
    assert_eq!(table.rows()[0].date, date(2023, 1, 31));
}

#[test]
fn test_rolling_means_include_current_day() {
    let table = build_features(&indexed_series(40)).unwrap();
    let first = &table.rows()[0];

    // days 24..=30 and 1..=30
    assert_relative_eq!(first.sales_ma_7, 27.0, epsilon = 1e-9);
    assert_relative_eq!(first.sales_ma_30, 15.5, epsilon = 1e-9);

    let last = table.last().unwrap();
    assert_relative_eq!(last.sales_ma_7, 36.0, epsilon = 1e-9);
    assert_relative_eq!(last.sales_ma_30, 24.5, epsilon = 1e-9);
}

#[test]
fn test_lags_are_positional_across_gaps() {
    let start = date(2023, 1, 1);
    let records: Vec<DailyRecord> = (0..35)
        .map(|i| DailyRecord {
            // every other day
            date: start + Days::new(2 * i as u64),
            total_sales: 10.0 * i as f64,
            total_quantity: 1,
            num_transactions: 1,
            avg_discount: 0.0,
        })
        .collect();
    let series = DailySeries::from_records(records).unwrap();

    let table = build_features(&series).unwrap();

    assert_eq!(table.len(), 5);
    let first = &table.rows()[0];
    assert_eq!(first.sales_lag_1, 290.0);
    assert_eq!(first.sales_lag_30, 0.0);
}

#[rstest]
#[case(date(2024, 1, 1), 0, 1, 1, false, true, false)]
#[case(date(2023, 1, 1), 6, 52, 1, true, true, false)]
#[case(date(2024, 2, 29), 3, 9, 1, false, false, true)]
#[case(date(2023, 12, 31), 6, 52, 4, true, false, true)]
#[case(date(2023, 7, 15), 5, 28, 3, true, false, false)]
fn test_calendar_features(
    #[case] day: NaiveDate,
    #[case] day_of_week: u32,
    #[case] week_of_year: u32,
    #[case] quarter: u32,
    #[case] is_weekend: bool,
    #[case] is_month_start: bool,
    #[case] is_month_end: bool,
) {
    let calendar = CalendarFeatures::from_date(day);
    assert_eq!(calendar.day_of_week, day_of_week);
    assert_eq!(calendar.week_of_year, week_of_year);
    assert_eq!(calendar.quarter, quarter);
    assert_eq!(calendar.is_weekend, is_weekend);
    assert_eq!(calendar.is_month_start, is_month_start);
    assert_eq!(calendar.is_month_end, is_month_end);
}

#[test]
fn test_day_of_year() {
    assert_eq!(CalendarFeatures::from_date(date(2024, 2, 29)).day_of_year, 60);
    assert_eq!(CalendarFeatures::from_date(date(2023, 12, 31)).day_of_year, 365);
}

#[test]
fn test_feature_matrix_layout() {
    let table = build_features(&indexed_series(35)).unwrap();
    let matrix = table.to_matrix();

    assert_eq!(matrix.nrows(), 5);
    assert_eq!(matrix.data().ncols(), 19);
    assert_eq!(matrix.names(), table.feature_names().as_slice());

    let first = &table.rows()[0];
    assert_eq!(matrix.data()[[0, 0]], 2023.0);
    assert_eq!(matrix.data()[[0, 13]], first.sales_lag_1);
    assert_eq!(matrix.data()[[0, 18]], first.trend);
    assert_eq!(table.targets().to_vec(), vec![30.0, 31.0, 32.0, 33.0, 34.0]);
}

#[test]
fn test_feature_matrix_name_count_must_match() {
    let names = vec!["a".to_string(), "b".to_string()];
    assert!(FeatureMatrix::new(names.clone(), Array2::zeros((3, 2))).is_ok());
    assert!(FeatureMatrix::new(names, Array2::zeros((3, 3))).is_err());
}

#[test]
fn test_split_at() {
    let table = build_features(&indexed_series(40)).unwrap();
    let (head, tail) = table.split_at(8);
    assert_eq!(head.len(), 8);
    assert_eq!(tail.len(), 2);
    assert!(head.last().unwrap().date < tail.rows()[0].date);
}

#[test]
fn test_build_features_is_idempotent() {
    let series = indexed_series(75);
    let first = build_features(&series).unwrap();
    let second = build_features(&series).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn prop_feature_rows_have_full_history(sales in prop::collection::vec(0.0f64..5_000.0, 1..120)) {
        let start = date(2022, 6, 1);
        let records = sales
            .iter()
            .enumerate()
            .map(|(i, &s)| DailyRecord {
                date: start + Days::new(i as u64),
                total_sales: s,
                total_quantity: 1,
                num_transactions: 1,
                avg_discount: 0.0,
            })
            .collect();
        let series = DailySeries::from_records(records).unwrap();

        let table = build_features(&series).unwrap();

        prop_assert_eq!(table.len(), sales.len().saturating_sub(MAX_LAG));
        for (k, row) in table.rows().iter().enumerate() {
            let i = k + MAX_LAG;
            prop_assert_eq!(row.sales_lag_1, sales[i - 1]);
            prop_assert_eq!(row.sales_lag_7, sales[i - 7]);
            prop_assert_eq!(row.sales_lag_30, sales[i - 30]);
            prop_assert!(row.values().iter().all(|v| v.is_finite()));
        }
    }
}
