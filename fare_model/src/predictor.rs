use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::bundle::ArtifactBundle;
use crate::error::Result;
use crate::features;
use crate::linear::LinearModel;
use crate::scaler::StandardScaler;
use crate::schema::FeatureLayout;
use crate::trip::TripInput;

/// Lower bound applied to both the model output and the final total.
pub const MIN_FARE: f64 = 1.00;

/// Loaded, validated bundle. Immutable once built; share it by reference or
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FareModel {
    layout: FeatureLayout,
    scaler: StandardScaler,
    model: LinearModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareEstimate {
    /// Model output after clamping.
    pub base_fare: f64,
    pub surcharges: f64,
    pub total: f64,
}

impl fmt::Display for FareEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.total)
    }
}

impl FareModel {
    pub fn load(dir: &Path) -> Result<Self> {
        let model = Self::from_bundle(ArtifactBundle::load(dir)?)?;
        tracing::info!(dir = %dir.display(), features = model.layout.len(), "loaded fare model");
        Ok(model)
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        let layout = bundle.layout()?;
        Ok(Self {
            layout,
            scaler: bundle.scaler,
            model: bundle.model,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Unclamped model output for an already reconstructed feature row.
    pub fn raw_prediction(&self, row: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform_row(row)?;
        self.model.predict_row(&scaled)
    }

    pub fn predict(&self, trip: &TripInput) -> Result<FareEstimate> {
        let row = features::reconstruct(trip, &self.layout)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let sample: Vec<String> = self
                .layout
                .columns()
                .iter()
                .zip(&row)
                .take(6)
                .map(|(name, v)| format!("{name}={v:.3}"))
                .collect();
            tracing::debug!(in_dim = row.len(), sample = %sample.join(", "), "reconstructed features");
        }

        self.estimate(trip, &row)
    }

    /// Clamps the model output for `row` and adds the trip's surcharges.
    /// `row` must come from `features::reconstruct` on the same trip; callers
    /// that already hold the row use this to avoid building it twice.
    pub fn estimate(&self, trip: &TripInput, row: &[f64]) -> Result<FareEstimate> {
        let base_fare = self.raw_prediction(row)?.max(MIN_FARE);
        let surcharges = trip.surcharges();
        let total = (base_fare + surcharges).max(MIN_FARE);
        Ok(FareEstimate {
            base_fare,
            surcharges,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FareError;
    use chrono::NaiveDate;

    fn model(intercept: f64) -> FareModel {
        FareModel::from_bundle(ArtifactBundle {
            scaler: StandardScaler {
                mean: vec![20.0, 0.0],
                scale: vec![10.0, 1.0],
            },
            model: LinearModel {
                coefficients: vec![20.0, 0.0],
                intercept,
            },
            columns: vec!["duration_minutes".into(), "RatecodeID_5".into()],
        })
        .unwrap()
    }

    fn trip() -> TripInput {
        TripInput::default_on(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap())
    }

    #[test]
    fn adds_surcharges_to_base_fare() {
        // scaled duration (30 - 20) / 10 = 1, so base = 45 + 20
        let est = model(45.0).predict(&trip()).unwrap();
        assert!((est.base_fare - 65.0).abs() < 1e-9);
        assert!((est.total - 66.3).abs() < 1e-9);
        assert_eq!(est.to_string(), "$66.30");
    }

    #[test]
    fn negative_model_output_clamps_to_minimum() {
        let mut t = trip();
        t.extra = 0.0;
        t.mta_tax = 0.0;
        t.improvement_surcharge = 0.0;
        let est = model(-500.0).predict(&t).unwrap();
        assert_eq!(est.base_fare, MIN_FARE);
        assert_eq!(est.total, MIN_FARE);
    }

    #[test]
    fn negative_surcharges_cannot_push_below_minimum() {
        let mut t = trip();
        t.tip_amount = -50.0;
        let est = model(-500.0).predict(&t).unwrap();
        assert_eq!(est.total, MIN_FARE);
    }

    #[test]
    fn reversed_trip_is_refused() {
        let mut t = trip();
        std::mem::swap(&mut t.pickup, &mut t.dropoff);
        let err = model(45.0).predict(&t).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, FareError::InvalidTripTimes { .. }));
    }

    #[test]
    fn estimate_on_prebuilt_row_matches_predict() {
        let m = model(45.0);
        let t = trip();
        let row = features::reconstruct(&t, m.layout()).unwrap();
        assert_eq!(m.estimate(&t, &row).unwrap(), m.predict(&t).unwrap());
    }

    #[test]
    fn estimate_rejects_row_of_wrong_width() {
        let err = model(45.0).estimate(&trip(), &[30.0]).unwrap_err();
        assert!(matches!(err, FareError::SchemaMismatch(_)));
    }
}
