use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FareError>;

#[derive(Debug, Error)]
pub enum FareError {
    /// Dropoff at or before pickup. No fare is computed for such a trip.
    #[error("dropoff time must be after pickup time (pickup {pickup}, dropoff {dropoff})")]
    InvalidTripTimes {
        pickup: NaiveDateTime,
        dropoff: NaiveDateTime,
    },

    #[error("invalid trip input: {0}")]
    InvalidInput(String),

    /// The persisted schema cannot be mapped onto the trip fields, or the
    /// bundle parts disagree with each other.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("dataset is missing label column `{0}`")]
    MissingLabel(String),

    #[error("label column `{0}` is not numeric")]
    NonNumericLabel(String),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("no numeric feature columns left after excluding label and derived columns")]
    NoNumericFeatures,

    #[error("numeric column `{column}` has a missing value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("least squares fit failed: {0}")]
    Fit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FareError {
    /// True for errors caused by the caller's trip attributes rather than by
    /// the artifacts or the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FareError::InvalidTripTimes { .. } | FareError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn validation_errors_are_classified() {
        let t = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert!(FareError::InvalidTripTimes { pickup: t, dropoff: t }.is_validation());
        assert!(FareError::InvalidInput("nan".into()).is_validation());
        assert!(!FareError::SchemaMismatch("x".into()).is_validation());
        assert!(!FareError::NoNumericFeatures.is_validation());
    }
}
