use nalgebra::{DMatrix, DVector};

use crate::bundle::ArtifactBundle;
use crate::dataset::TripDataset;
use crate::error::{FareError, Result};
use crate::linear::LinearModel;
use crate::scaler::StandardScaler;

pub const DEFAULT_LABEL: &str = "fare_amount";

/// Timestamps, the label itself and columns derived from the label. Keeping
/// any of these as features would leak the answer into the model.
pub const DEFAULT_EXCLUDED: [&str; 9] = [
    "tpep_pickup_datetime",
    "tpep_dropoff_datetime",
    "fare_amount",
    "total_amount",
    "fare_per_km",
    "fare_per_min",
    "log_total_amount",
    "log_distance",
    "log_duration",
];

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub label: String,
    /// Dropped before feature selection. Names absent from the dataset are ignored.
    pub exclude: Vec<String>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// In-sample fit summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub rows: usize,
    pub features: usize,
    pub r2: f64,
    pub rmse: f64,
}

/// Feature schema for `dataset`: numeric columns in header order, minus the
/// label and the excluded names.
pub fn select_features(dataset: &TripDataset, opts: &TrainOptions) -> Vec<String> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.name != opts.label && !opts.exclude.iter().any(|e| *e == c.name))
        .filter(|c| c.is_numeric())
        .map(|c| c.name.clone())
        .collect()
}

/// Fits the scaler and the linear model. Every failure surfaces before a
/// bundle exists, so a caller that saves only on `Ok` never writes a
/// degenerate model.
pub fn train(dataset: &TripDataset, opts: &TrainOptions) -> Result<(ArtifactBundle, TrainingReport)> {
    let label = dataset
        .column(&opts.label)
        .ok_or_else(|| FareError::MissingLabel(opts.label.clone()))?;
    if !label.is_numeric() {
        return Err(FareError::NonNumericLabel(opts.label.clone()));
    }
    if dataset.rows() == 0 {
        return Err(FareError::EmptyDataset);
    }

    let columns = select_features(dataset, opts);
    if columns.is_empty() {
        return Err(FareError::NoNumericFeatures);
    }
    tracing::debug!(?columns, "selected feature columns");

    let y = DVector::from_vec(label.dense_values()?);
    let mut x = DMatrix::<f64>::zeros(dataset.rows(), columns.len());
    for (j, name) in columns.iter().enumerate() {
        let values = dataset.numeric_values(name)?;
        x.set_column(j, &DVector::from_vec(values));
    }

    let scaler = StandardScaler::fit(&x)?;
    let scaled = scaler.transform(&x)?;
    let model = LinearModel::fit(&scaled, &y)?;

    let fitted = model.predict(&scaled)?;
    let report = report(&y, &fitted, columns.len());

    let bundle = ArtifactBundle {
        scaler,
        model,
        columns,
    };
    // Same check the predictor runs on load.
    bundle.layout().map_err(|e| match e {
        FareError::SchemaMismatch(msg) => FareError::SchemaMismatch(format!(
            "{msg}; add them to exclude_columns to train without them"
        )),
        other => other,
    })?;

    Ok((bundle, report))
}

fn report(y: &DVector<f64>, fitted: &DVector<f64>, features: usize) -> TrainingReport {
    let n = y.len() as f64;
    let y_mean = y.mean();
    let ss_res: f64 = y.iter().zip(fitted.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|t| (t - y_mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
    TrainingReport {
        rows: y.len(),
        features,
        r2,
        rmse: (ss_res / n).sqrt(),
    }
}
