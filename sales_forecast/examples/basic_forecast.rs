use chrono::{Days, NaiveDate};
use sales_forecast::{ModelFamily, SalesForecaster, TrainConfig, TransactionRow};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    println!("Creating sample transactions...");
    let rows = create_sample_transactions(180);
    println!("Sample data created: {} transactions\n", rows.len());

    let session = SalesForecaster::new(rows)?;
    println!(
        "Aggregated into {} days, {} feature rows\n",
        session.daily().len(),
        session.features().len()
    );

    for family in [
        ModelFamily::Linear,
        ModelFamily::RandomForest,
        ModelFamily::GradientBoosting,
    ] {
        println!("Training {} model...", family);
        let (trained, outcome) = session
            .clone()
            .train(&TrainConfig::new(family).with_n_estimators(50))?;
        println!("{}\n", outcome.metrics);

        let forecast = trained.predict_future(7)?;
        println!("7-day forecast:");
        for point in forecast.points() {
            println!("  {}: {:.2}", point.date, point.predicted_sales);
        }
        println!("  Total: {:.2}\n", forecast.total());

        println!("{}\n", trained.feature_importance(5)?);
    }

    Ok(())
}

// Weekday/weekend pattern with a slow upward drift
fn create_sample_transactions(days: u64) -> Vec<TransactionRow> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN);
    let mut rows = Vec::new();
    let mut id = 0;

    for day in 0..days {
        let date = start + Days::new(day);
        let weekend = matches!(chrono::Datelike::weekday(&date), chrono::Weekday::Sat | chrono::Weekday::Sun);
        let count = if weekend { 6 } else { 3 };

        for k in 0..count {
            id += 1;
            let quantity = 1 + ((day + k) % 3) as u32;
            let amount = (20.0 + day as f64 * 0.2 + k as f64 * 7.5) * quantity as f64;
            let discount = ((day + k) % 4) as f64 * 5.0;
            rows.push(TransactionRow::new(date, amount, quantity, discount, format!("TXN{:06}", id)));
        }
    }

    rows
}
