//! Persisted output of training: scaler, model and feature schema, stored as
//! three JSON files side by side in one directory.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{FareError, Result};
use crate::linear::LinearModel;
use crate::scaler::StandardScaler;
use crate::schema::FeatureLayout;

pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";
pub const COLUMNS_FILE: &str = "expected_columns.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub scaler: StandardScaler,
    pub model: LinearModel,
    /// Authoritative column order for both the scaler and the model.
    pub columns: Vec<String>,
}

impl ArtifactBundle {
    /// Checks that the three parts agree on width and that every column can
    /// be rebuilt from a trip, returning the resolved layout.
    pub fn layout(&self) -> Result<FeatureLayout> {
        self.scaler.check()?;
        let n = self.columns.len();
        if self.scaler.n_features() != n {
            return Err(FareError::SchemaMismatch(format!(
                "scaler has {} features but schema lists {} columns",
                self.scaler.n_features(),
                n
            )));
        }
        if self.model.n_features() != n {
            return Err(FareError::SchemaMismatch(format!(
                "model has {} coefficients but schema lists {} columns",
                self.model.n_features(),
                n
            )));
        }
        FeatureLayout::resolve(&self.columns)
    }

    /// Writes all three files, replacing any previous bundle in `dir`.
    /// Nothing is written unless the bundle is consistent.
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.layout()?;

        let scaler = serde_json::to_string_pretty(&self.scaler)?;
        let model = serde_json::to_string_pretty(&self.model)?;
        let columns = serde_json::to_string_pretty(&self.columns)?;

        fs::create_dir_all(dir)?;
        fs::write(dir.join(SCALER_FILE), scaler)?;
        fs::write(dir.join(MODEL_FILE), model)?;
        fs::write(dir.join(COLUMNS_FILE), columns)?;
        tracing::info!(dir = %dir.display(), features = self.columns.len(), "artifact bundle written");
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let bundle = Self {
            scaler: read_json(&dir.join(SCALER_FILE))?,
            model: read_json(&dir.join(MODEL_FILE))?,
            columns: read_json(&dir.join(COLUMNS_FILE))?,
        };
        bundle.layout()?;
        Ok(bundle)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let txt = fs::read_to_string(path).map_err(|e| {
        FareError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read {}: {e}", path.display()),
        ))
    })?;
    Ok(serde_json::from_str(&txt)?)
}
