use anyhow::{Context, Result};
use fare_model::training::{DEFAULT_EXCLUDED, DEFAULT_LABEL};
use fare_model::TrainOptions;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainerConfig {
    pub dataset_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub label_column: String,
    pub exclude_columns: Vec<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("cleaned_taxi_data.csv"),
            artifact_dir: PathBuf::from("artifacts"),
            label_column: DEFAULT_LABEL.to_string(),
            exclude_columns: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TrainerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read trainer config at {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("invalid trainer config JSON in {}", path.display()))
    }

    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            label: self.label_column.clone(),
            exclude: self.exclude_columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.json");
        fs::write(&path, r#"{ "dataset_path": "trips.csv", "exclude_columns": ["trip_distance"] }"#).unwrap();

        let cfg = TrainerConfig::load(&path).unwrap();
        assert_eq!(cfg.dataset_path, PathBuf::from("trips.csv"));
        assert_eq!(cfg.artifact_dir, PathBuf::from("artifacts"));
        assert_eq!(cfg.label_column, "fare_amount");
        assert_eq!(cfg.train_options().exclude, vec!["trip_distance".to_string()]);
    }

    #[test]
    fn bad_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(TrainerConfig::load(&path).is_err());
        assert!(TrainerConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
