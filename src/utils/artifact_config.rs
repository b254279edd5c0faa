// src/utils/artifact_config.rs
use log::{debug, info};
use std::env;
use std::path::{Path, PathBuf};

use crate::utils::constants::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_FEATURE_NAMES_FILE, DEFAULT_LABEL_MAP_FILE, DEFAULT_MODEL_FILE,
};

/// Where the classifier, label map and feature schema live on disk.
///
/// File names are resolved against `artifacts_dir` unless they are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub artifacts_dir: PathBuf,
    pub model_file: PathBuf,
    pub label_map_file: PathBuf,
    pub feature_names_file: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            model_file: PathBuf::from(DEFAULT_MODEL_FILE),
            label_map_file: PathBuf::from(DEFAULT_LABEL_MAP_FILE),
            feature_names_file: PathBuf::from(DEFAULT_FEATURE_NAMES_FILE),
        }
    }
}

impl ArtifactConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let config = Self {
            artifacts_dir: env::var("STOCK_ARTIFACTS_DIR")
                .unwrap_or_else(|_| DEFAULT_ARTIFACTS_DIR.to_string())
                .into(),
            model_file: env::var("STOCK_MODEL_FILE")
                .unwrap_or_else(|_| DEFAULT_MODEL_FILE.to_string())
                .into(),
            label_map_file: env::var("STOCK_LABEL_MAP_FILE")
                .unwrap_or_else(|_| DEFAULT_LABEL_MAP_FILE.to_string())
                .into(),
            feature_names_file: env::var("STOCK_FEATURE_NAMES_FILE")
                .unwrap_or_else(|_| DEFAULT_FEATURE_NAMES_FILE.to_string())
                .into(),
        };
        debug!("Artifact config from env: {:?}", config);
        config
    }

    /// Apply command-line overrides on top of the environment configuration.
    pub fn with_overrides(
        mut self,
        artifacts_dir: Option<PathBuf>,
        model_file: Option<PathBuf>,
        label_map_file: Option<PathBuf>,
        feature_names_file: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = artifacts_dir {
            self.artifacts_dir = dir;
        }
        if let Some(file) = model_file {
            self.model_file = file;
        }
        if let Some(file) = label_map_file {
            self.label_map_file = file;
        }
        if let Some(file) = feature_names_file {
            self.feature_names_file = file;
        }
        self
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.model_file)
    }

    pub fn label_map_path(&self) -> PathBuf {
        self.resolve(&self.label_map_file)
    }

    pub fn feature_names_path(&self) -> PathBuf {
        self.resolve(&self.feature_names_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.artifacts_dir.join(file)
        }
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("📦 Loading model artifacts from {}", self.artifacts_dir.display());
        info!("   Model:         {}", self.model_path().display());
        info!("   Label map:     {}", self.label_map_path().display());
        info!("   Feature names: {}", self.feature_names_path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = ArtifactConfig::default();
        assert_eq!(config.model_path(), PathBuf::from("./lr_model.json"));
        assert_eq!(config.label_map_path(), PathBuf::from("./label_map.json"));
        assert_eq!(
            config.feature_names_path(),
            PathBuf::from("./feature_names.json")
        );
    }

    #[test]
    fn test_env_config() {
        env::set_var("STOCK_ARTIFACTS_DIR", "/srv/models");
        env::set_var("STOCK_MODEL_FILE", "model_v2.json");
        env::set_var("STOCK_LABEL_MAP_FILE", "/etc/stock/labels.json");
        env::remove_var("STOCK_FEATURE_NAMES_FILE");

        let config = ArtifactConfig::from_env();
        assert_eq!(config.model_path(), PathBuf::from("/srv/models/model_v2.json"));
        // Absolute file names are not joined onto the directory
        assert_eq!(config.label_map_path(), PathBuf::from("/etc/stock/labels.json"));
        assert_eq!(
            config.feature_names_path(),
            PathBuf::from("/srv/models/feature_names.json")
        );

        // Clean up
        env::remove_var("STOCK_ARTIFACTS_DIR");
        env::remove_var("STOCK_MODEL_FILE");
        env::remove_var("STOCK_LABEL_MAP_FILE");
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = ArtifactConfig::default().with_overrides(
            Some(PathBuf::from("artifacts")),
            None,
            Some(PathBuf::from("labels.json")),
            None,
        );
        assert_eq!(config.model_path(), PathBuf::from("artifacts/lr_model.json"));
        assert_eq!(config.label_map_path(), PathBuf::from("artifacts/labels.json"));
    }
}
