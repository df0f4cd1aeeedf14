//! Sales forecasting CLI.
//!
//! # Usage
//!
//! ```bash
//! # Train a random forest and save the artifact
//! sales-forecast train -d data/sales_data.csv -o model.json
//!
//! # Forecast 30 days with a saved model
//! sales-forecast forecast -d data/sales_data.csv -m model.json -o forecast.csv
//!
//! # Train a boosted model and show the ten most important features
//! sales-forecast importance -d data/sales_data.csv -f gradient_boosting -n 10
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use sales_forecast::{ForecastConfig, ModelFamily, SalesForecaster};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sales-forecast")]
#[command(about = "Daily sales forecasting from transaction logs", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Transaction CSV file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Model family (linear, random_forest, gradient_boosting)
    #[arg(short, long)]
    family: Option<ModelFamily>,

    /// Fraction of the most recent days held out for evaluation
    #[arg(long)]
    test_size: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model, print its metrics and save the artifact
    Train {
        #[command(flatten)]
        data: DataArgs,

        /// Artifact output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forecast future daily sales
    Forecast {
        #[command(flatten)]
        data: DataArgs,

        /// Saved model to use instead of training a new one
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Days to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Forecast CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the most important features of a model
    Importance {
        #[command(flatten)]
        data: DataArgs,

        /// Saved model to use instead of training a new one
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Number of features to show
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ForecastConfig> {
    match path {
        Some(path) => ForecastConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ForecastConfig::default()),
    }
}

fn apply_data_args(config: &mut ForecastConfig, args: DataArgs) {
    if let Some(data) = args.data {
        config.data_path = Some(data);
    }
    if let Some(family) = args.family {
        config.train.family = family;
    }
    if let Some(test_size) = args.test_size {
        config.train.test_size = test_size;
    }
}

fn open_session(config: &ForecastConfig) -> Result<SalesForecaster> {
    let path = config
        .data_path
        .as_ref()
        .ok_or_else(|| anyhow!("No data file given (use --data or data_path in the config)"))?;
    SalesForecaster::from_csv(path).with_context(|| format!("Failed to prepare {}", path.display()))
}

/// Attach the configured model artifact, or train a fresh model
fn trained_session(config: &ForecastConfig) -> Result<SalesForecaster> {
    let session = open_session(config)?;
    match &config.model_path {
        Some(path) => session
            .load_model(path)
            .with_context(|| format!("Failed to load model {}", path.display())),
        None => {
            let (session, outcome) = session.train(&config.train)?;
            println!("{}", outcome.metrics);
            Ok(session)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Train { data, output } => {
            apply_data_args(&mut config, data);
            let session = open_session(&config)?;
            let (session, outcome) = session.train(&config.train)?;
            println!("{}", outcome.metrics);

            let output = output
                .or(config.model_path.clone())
                .unwrap_or_else(|| PathBuf::from("sales_model.json"));
            session.save_model(&output)?;
            info!(path = %output.display(), "Training complete");
        }
        Commands::Forecast {
            data,
            model,
            horizon,
            output,
        } => {
            apply_data_args(&mut config, data);
            if model.is_some() {
                config.model_path = model;
            }
            let horizon = horizon.unwrap_or(config.horizon);

            let session = trained_session(&config)?;
            let forecast = session.predict_future(horizon)?;

            for point in forecast.points() {
                println!("{}  {:>12.2}", point.date, point.predicted_sales);
            }
            println!("Total predicted sales: {:.2}", forecast.total());

            if let Some(output) = output.or(config.output_path.clone()) {
                forecast.to_csv(&output)?;
            }
        }
        Commands::Importance { data, model, top_n } => {
            apply_data_args(&mut config, data);
            if model.is_some() {
                config.model_path = model;
            }
            let top_n = top_n.unwrap_or(config.top_n);

            let session = trained_session(&config)?;
            println!("{}", session.feature_importance(top_n)?);
        }
    }

    Ok(())
}
