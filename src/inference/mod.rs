// src/inference/mod.rs
pub mod artifacts;
pub mod context;

pub use artifacts::{load_artifacts, read_json_artifact, LoadedArtifacts};
pub use context::{Prediction, PredictionContext};
