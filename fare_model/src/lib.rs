//! Taxi fare estimation: training a scaled linear model from trip records and
//! rebuilding the exact same feature row for a single trip at prediction time.

pub mod bundle;
pub mod dataset;
pub mod error;
pub mod features;
pub mod linear;
pub mod predictor;
pub mod scaler;
pub mod schema;
pub mod training;
pub mod trip;

pub use bundle::ArtifactBundle;
pub use dataset::TripDataset;
pub use error::{FareError, Result};
pub use predictor::{FareEstimate, FareModel, MIN_FARE};
pub use schema::{BaseField, CategoricalField, FeatureLayout, FeatureSource};
pub use training::{train, TrainOptions, TrainingReport};
pub use trip::TripInput;
