// src/inference/artifacts.rs
use anyhow::{Context, Result};
use log::info;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::features::FeatureSchema;
use crate::model::{Classifier, LabelMap, LinearClassifier};
use crate::utils::artifact_config::ArtifactConfig;

/// Read and parse one JSON artifact, naming the file in any error.
pub fn read_json_artifact<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} in {}", what, path.display()))
}

/// Everything the predictor needs, as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub schema: FeatureSchema,
    pub label_map: LabelMap,
    pub model: LinearClassifier,
}

pub fn load_artifacts(config: &ArtifactConfig) -> Result<LoadedArtifacts> {
    let schema: FeatureSchema = read_json_artifact(&config.feature_names_path(), "feature names")?;
    info!("Loaded feature schema with {} columns", schema.len());

    let label_map: LabelMap = read_json_artifact(&config.label_map_path(), "label map")?;
    info!(
        "Loaded label map: {}",
        label_map.labels().collect::<Vec<_>>().join(", ")
    );

    let model: LinearClassifier = read_json_artifact(&config.model_path(), "model")?;
    info!("Loaded linear model over {} classes", model.classes().len());

    Ok(LoadedArtifacts {
        schema,
        label_map,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_artifact_names_the_file() {
        let dir = tempdir().unwrap();
        let config = ArtifactConfig {
            artifacts_dir: dir.path().to_path_buf(),
            ..ArtifactConfig::default()
        };

        let err = load_artifacts(&config).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("feature names"), "{}", message);
        assert!(message.contains("feature_names.json"), "{}", message);
    }

    #[test]
    fn test_unparseable_artifact_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("label_map.json");
        fs::write(&path, "[\"not\", \"a\", \"map\"]").unwrap();

        let err = read_json_artifact::<LabelMap>(&path, "label map").unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to parse label map"));
    }
}
