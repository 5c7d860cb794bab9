use fare_model::{FareError, FareEstimate};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionOut {
    pub fare: f64,
    pub base_fare: f64,
    pub surcharges: f64,
    /// Total formatted as currency, e.g. "$12.34".
    pub display: String,
}

impl From<FareEstimate> for PredictionOut {
    fn from(est: FareEstimate) -> Self {
        Self {
            fare: round_cents(est.total),
            base_fare: round_cents(est.base_fare),
            surcharges: round_cents(est.surcharges),
            display: est.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Schema,
    Internal,
}

#[derive(Debug, Serialize, Clone)]
pub struct ErrorOut {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&FareError> for ErrorOut {
    fn from(err: &FareError) -> Self {
        let kind = if err.is_validation() {
            ErrorKind::Validation
        } else if matches!(err, FareError::SchemaMismatch(_)) {
            ErrorKind::Schema
        } else {
            ErrorKind::Internal
        };
        Self {
            error: err.to_string(),
            kind,
        }
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn error_kinds_by_failure() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let reversed = FareError::InvalidTripTimes {
            pickup: day.and_hms_opt(9, 30, 0).unwrap(),
            dropoff: day.and_hms_opt(9, 0, 0).unwrap(),
        };
        assert_eq!(ErrorOut::from(&reversed).kind, ErrorKind::Validation);

        let schema = ErrorOut::from(&FareError::SchemaMismatch(
            "columns not derivable from trip input: trip_distance".into(),
        ));
        assert_eq!(schema.kind, ErrorKind::Schema);
        assert!(schema.error.contains("trip_distance"));

        let fit = ErrorOut::from(&FareError::Fit("solution has non-finite coefficients".into()));
        assert_eq!(fit.kind, ErrorKind::Internal);
    }

    #[test]
    fn kinds_serialize_in_snake_case() {
        let out = ErrorOut {
            error: "bad".into(),
            kind: ErrorKind::Schema,
        };
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({ "error": "bad", "kind": "schema" })
        );
        assert_eq!(serde_json::to_value(ErrorKind::Internal).unwrap(), "internal");
    }

    #[test]
    fn prediction_rounds_to_cents() {
        let out = PredictionOut::from(FareEstimate {
            base_fare: 18.004,
            surcharges: 1.3,
            total: 19.304,
        });
        assert_eq!(out.fare, 19.3);
        assert_eq!(out.base_fare, 18.0);
        assert_eq!(out.display, "$19.30");
    }
}
