// src/inference/context.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::features::{
    align, stock_categorical_fields, AlignedFeatureVector, Alignment, AlignmentIssue,
    FeatureLayout, RawInputRecord,
};
use crate::inference::artifacts::load_artifacts;
use crate::model::{Classifier, LabelMap};
use crate::utils::artifact_config::ArtifactConfig;

/// Outcome of one form submission.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub request_id: Uuid,
    pub predicted_at: DateTime<Utc>,
    pub status: String,
    pub class_code: i64,
    /// Probability the model assigns to `status`, when it reports one.
    pub confidence: Option<f64>,
    pub input: RawInputRecord,
    pub features: AlignedFeatureVector,
    pub issues: Vec<AlignmentIssue>,
}

/// Read-only state shared by every prediction: the validated feature layout,
/// the label map and the classifier. Built once at startup.
pub struct PredictionContext {
    layout: FeatureLayout,
    label_map: LabelMap,
    model: Box<dyn Classifier>,
}

impl PredictionContext {
    /// Check that the three artifacts agree with each other.
    pub fn new(layout: FeatureLayout, label_map: LabelMap, model: Box<dyn Classifier>) -> Result<Self> {
        if model.n_features() != layout.schema().len() {
            bail!(
                "Model expects {} features but the feature schema has {} columns",
                model.n_features(),
                layout.schema().len()
            );
        }
        let unlabeled: Vec<i64> = model
            .classes()
            .iter()
            .copied()
            .filter(|code| !label_map.contains_code(*code))
            .collect();
        if !unlabeled.is_empty() {
            bail!(
                "Label map has no entry for model class code(s) {:?}",
                unlabeled
            );
        }
        for code in label_map.codes() {
            if !model.classes().contains(&code) {
                warn!(
                    "Label map entry {} ({}) is never produced by the model",
                    code,
                    label_map.decode(code).unwrap_or("?")
                );
            }
        }

        Ok(Self {
            layout,
            label_map,
            model,
        })
    }

    /// Load artifacts from disk for the stock status form.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        let artifacts = load_artifacts(config)?;
        let layout = FeatureLayout::new(artifacts.schema, stock_categorical_fields())
            .context("Feature schema does not fit the stock status form")?;
        layout.log_summary();
        Self::new(layout, artifacts.label_map, Box::new(artifacts.model))
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_map
    }

    pub fn predict(&self, raw_input: &RawInputRecord) -> Result<Prediction> {
        let Alignment { vector, issues } = align(raw_input, &self.layout);

        let class_code = self
            .model
            .predict(vector.values())
            .context("Classifier failed on the aligned feature vector")?;
        let status = self.label_map.decode(class_code)?.to_string();
        let confidence = self
            .model
            .predict_proba(vector.values())?
            .and_then(|probs| {
                let idx = self.model.classes().iter().position(|c| *c == class_code)?;
                probs.get(idx).copied()
            });

        let prediction = Prediction {
            request_id: Uuid::new_v4(),
            predicted_at: Utc::now(),
            status,
            class_code,
            confidence,
            input: raw_input.clone(),
            features: vector,
            issues,
        };
        info!(
            "Prediction {}: {} (class {}, confidence {}, {} alignment issue(s))",
            prediction.request_id,
            prediction.status,
            prediction.class_code,
            prediction
                .confidence
                .map_or_else(|| "n/a".to_string(), |c| format!("{:.3}", c)),
            prediction.issues.len()
        );
        Ok(prediction)
    }
}
