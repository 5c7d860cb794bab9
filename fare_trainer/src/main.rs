use anyhow::{Context, Result};
use clap::Parser;
use fare_model::{train, TripDataset};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

use config::TrainerConfig;

/// Fit the fare scaler and linear model from historical trips and write the
/// artifact bundle.
#[derive(Parser, Debug)]
#[command(name = "fare_trainer", version)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long, env = "FARE_TRAINER_CONFIG")]
    config: Option<PathBuf>,

    /// Training CSV with a header row
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory receiving scaler.json, model.json and expected_columns.json
    #[arg(long)]
    out: Option<PathBuf>,

    /// Label column
    #[arg(long)]
    label: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => TrainerConfig::load(path)?,
        None => TrainerConfig::default(),
    };
    if let Some(data) = cli.data {
        cfg.dataset_path = data;
    }
    if let Some(out) = cli.out {
        cfg.artifact_dir = out;
    }
    if let Some(label) = cli.label {
        cfg.label_column = label;
    }

    tracing::info!("reading {}", cfg.dataset_path.display());
    let dataset = TripDataset::from_path(&cfg.dataset_path)
        .with_context(|| format!("failed to load dataset {}", cfg.dataset_path.display()))?;
    tracing::info!(rows = dataset.rows(), columns = dataset.columns().len(), "dataset loaded");

    let (bundle, report) = train(&dataset, &cfg.train_options()).context("training failed")?;
    tracing::info!(
        "fitted on {} rows, {} features: r2={:.4} rmse={:.4}",
        report.rows,
        report.features,
        report.r2,
        report.rmse
    );
    tracing::info!("feat_list[{}]: {:?}", bundle.columns.len(), &bundle.columns);

    bundle
        .save(&cfg.artifact_dir)
        .with_context(|| format!("failed to write artifacts to {}", cfg.artifact_dir.display()))?;
    Ok(())
}
