use chrono::{Days, NaiveDate};
use sales_forecast::{
    generate_forecast, ForecastError, ModelFamily, SalesForecaster, TrainConfig, TransactionRow,
};
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to create a transaction log with two or three sales per day
fn create_sample_data(days: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    writeln!(
        file,
        "Transaction_ID,Date,Customer_ID,Product_Category,Quantity,Unit_Price,Total_Amount,Discount_Percent"
    )
    .unwrap();

    let mut id = 0;
    for day in 0..days {
        let date = start + Days::new(day as u64);
        let per_day = 2 + day % 2;
        for k in 0..per_day {
            id += 1;
            let quantity = 1 + (day + k) % 4;
            let price = 40.0 + (day % 7) as f64 * 10.0;
            writeln!(
                file,
                "TXN{:06},{},CUST{:04},Electronics,{},{:.2},{:.2},{}",
                id,
                date.format("%Y-%m-%d"),
                id % 50,
                quantity,
                price,
                price * quantity as f64,
                (k * 5) % 20
            )
            .unwrap();
        }
    }

    // duplicate of the first transaction
    writeln!(
        file,
        "TXN000001,2023-01-01,CUST0001,Electronics,1,40.00,40.00,0"
    )
    .unwrap();

    file
}

#[test]
fn test_full_forecast_workflow() {
    let data_file = create_sample_data(90);

    let session = SalesForecaster::from_csv(data_file.path()).unwrap();
    assert_eq!(session.daily().len(), 90);
    assert_eq!(session.daily().records()[0].num_transactions, 2);
    assert_eq!(session.features().len(), 60);
    assert!(!session.is_trained());

    let config = TrainConfig::new(ModelFamily::RandomForest).with_n_estimators(10);
    let (session, outcome) = session.train(&config).unwrap();
    assert!(session.is_trained());
    assert_eq!(outcome.n_test, 12);

    let forecast = session.predict_future(14).unwrap();
    assert_eq!(forecast.horizon(), 14);
    assert_eq!(
        forecast.dates()[0],
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
    );
    assert!(forecast.values().iter().all(|v| *v >= 0.0));

    let importance = session.feature_importance(5).unwrap();
    assert_eq!(importance.ranked().unwrap().len(), 5);

    let model_file = NamedTempFile::new().unwrap();
    session.save_model(model_file.path()).unwrap();

    let reloaded = SalesForecaster::from_csv(data_file.path())
        .unwrap()
        .load_model(model_file.path())
        .unwrap();
    assert_eq!(reloaded.predict_future(14).unwrap(), forecast);
}

#[test]
fn test_generate_forecast() {
    let data_file = create_sample_data(60);

    let run = generate_forecast(data_file.path(), 7, ModelFamily::Linear).unwrap();

    assert_eq!(run.forecast.horizon(), 7);
    assert!(run.metrics.train_mae.is_finite());
    assert_eq!(run.forecaster.model().unwrap().family(), ModelFamily::Linear);
}

#[test]
fn test_model_required() {
    let data_file = create_sample_data(45);
    let session = SalesForecaster::from_csv(data_file.path()).unwrap();
    let model_file = NamedTempFile::new().unwrap();

    assert!(matches!(session.predict_future(5), Err(ForecastError::ModelNotTrained)));
    assert!(matches!(session.feature_importance(5), Err(ForecastError::ModelNotTrained)));
    assert!(matches!(
        session.save_model(model_file.path()),
        Err(ForecastError::ModelNotTrained)
    ));
}

#[test]
fn test_constant_sales_session() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows: Vec<TransactionRow> = (0..40)
        .map(|i| TransactionRow::new(start + Days::new(i), 100.0, 1, 0.0, format!("T{}", i)))
        .collect();

    let session = SalesForecaster::new(rows).unwrap();
    let (session, _) = session.train(&TrainConfig::new(ModelFamily::Linear)).unwrap();
    let forecast = session.predict_future(5).unwrap();

    assert_eq!(forecast.horizon(), 5);
    assert!(forecast.values().iter().all(|v| (v - 100.0).abs() < 1e-6));
}

#[test]
fn test_short_history_is_untrainable() {
    let data_file = create_sample_data(10);
    let session = SalesForecaster::from_csv(data_file.path()).unwrap();
    assert!(session.features().is_empty());

    let result = session.train(&TrainConfig::new(ModelFamily::Linear));
    assert!(matches!(result, Err(ForecastError::UntrainableInput(_))));
}

#[test]
fn test_session_from_daily_series() {
    let data_file = create_sample_data(50);
    let rows = sales_forecast::DataLoader::from_csv(data_file.path()).unwrap();
    let daily = sales_forecast::aggregate_daily(&sales_forecast::drop_duplicates(rows)).unwrap();

    let session = SalesForecaster::from_daily(daily.clone()).unwrap();
    assert_eq!(session.daily(), &daily);
    assert_eq!(session.features().len(), 20);

    let (trained, outcome) = session
        .clone()
        .train(&TrainConfig::new(ModelFamily::GradientBoosting).with_n_estimators(5))
        .unwrap();
    let attached = session.with_model(outcome.model);
    assert_eq!(
        attached.predict_future(3).unwrap(),
        trained.predict_future(3).unwrap()
    );
}
