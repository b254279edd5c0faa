// src/model/classifier.rs
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierError {
    FeatureCountMismatch { expected: usize, got: usize },
    NonFiniteFeature { index: usize, value: f64 },
    /// The linear score overflowed; inputs are too large for the model.
    NonFiniteScore { row: usize, value: f64 },
    InvalidModel(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierError::FeatureCountMismatch { expected, got } => write!(
                f,
                "Expected {} features, but got {}",
                expected, got
            ),
            ClassifierError::NonFiniteFeature { index, value } => {
                write!(f, "Feature {} is not a finite number ({})", index, value)
            }
            ClassifierError::NonFiniteScore { row, value } => write!(
                f,
                "Decision value {} is not a finite number ({}); input values are out of range",
                row, value
            ),
            ClassifierError::InvalidModel(reason) => write!(f, "Invalid model: {}", reason),
        }
    }
}

impl std::error::Error for ClassifierError {}

/// A trained model that maps a schema-ordered feature vector to a class code.
pub trait Classifier {
    fn n_features(&self) -> usize;

    /// Class codes the model can emit.
    fn classes(&self) -> &[i64];

    fn predict(&self, features: &[f64]) -> Result<i64, ClassifierError>;

    /// Per-class probabilities aligned with `classes()`, when the model provides them.
    fn predict_proba(&self, _features: &[f64]) -> Result<Option<Vec<f64>>, ClassifierError> {
        Ok(None)
    }
}

/// On-disk layout of a logistic regression: one coefficient row per class, or a
/// single row for the positive class of a binary model.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinearModelFile {
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

/// Logistic regression inference over a fixed coefficient matrix.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "LinearModelFile", into = "LinearModelFile")]
pub struct LinearClassifier {
    classes: Vec<i64>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl TryFrom<LinearModelFile> for LinearClassifier {
    type Error = ClassifierError;

    fn try_from(file: LinearModelFile) -> Result<Self, Self::Error> {
        if file.classes.len() < 2 {
            return Err(ClassifierError::InvalidModel(format!(
                "need at least 2 classes, found {}",
                file.classes.len()
            )));
        }
        let unique: HashSet<i64> = file.classes.iter().copied().collect();
        if unique.len() != file.classes.len() {
            return Err(ClassifierError::InvalidModel(
                "class codes are not unique".to_string(),
            ));
        }

        let rows = file.coef.len();
        let expected_rows = if file.classes.len() == 2 { 1 } else { file.classes.len() };
        if rows != expected_rows {
            return Err(ClassifierError::InvalidModel(format!(
                "{} classes need {} coefficient rows, found {}",
                file.classes.len(),
                expected_rows,
                rows
            )));
        }
        if file.intercept.len() != rows {
            return Err(ClassifierError::InvalidModel(format!(
                "{} coefficient rows but {} intercepts",
                rows,
                file.intercept.len()
            )));
        }

        let cols = file.coef[0].len();
        if cols == 0 || file.coef.iter().any(|row| row.len() != cols) {
            return Err(ClassifierError::InvalidModel(
                "coefficient rows must be non-empty and of equal length".to_string(),
            ));
        }

        let flat: Vec<f64> = file.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| ClassifierError::InvalidModel(e.to_string()))?;

        Ok(Self {
            classes: file.classes,
            coef,
            intercept: Array1::from(file.intercept),
        })
    }
}

impl From<LinearClassifier> for LinearModelFile {
    fn from(model: LinearClassifier) -> Self {
        Self {
            classes: model.classes,
            coef: model.coef.outer_iter().map(|row| row.to_vec()).collect(),
            intercept: model.intercept.to_vec(),
        }
    }
}

impl LinearClassifier {
    pub fn coefficients(&self) -> ArrayView2<'_, f64> {
        self.coef.view()
    }

    pub fn intercepts(&self) -> ArrayView1<'_, f64> {
        self.intercept.view()
    }

    pub fn is_binary(&self) -> bool {
        self.classes.len() == 2
    }

    fn check_input(&self, features: &[f64]) -> Result<(), ClassifierError> {
        if features.len() != self.n_features() {
            warn!(
                "Expected {} features, but got {}. Refusing to predict.",
                self.n_features(),
                features.len()
            );
            return Err(ClassifierError::FeatureCountMismatch {
                expected: self.n_features(),
                got: features.len(),
            });
        }
        if let Some((index, value)) = features.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ClassifierError::NonFiniteFeature {
                index,
                value: *value,
            });
        }
        Ok(())
    }

    /// Raw linear scores, one per coefficient row.
    pub fn decision_function(&self, features: &[f64]) -> Result<Array1<f64>, ClassifierError> {
        self.check_input(features)?;
        let x = ArrayView1::from(features);
        let scores = self.coef.dot(&x) + &self.intercept;
        debug!("Decision values: {:?}", scores.to_vec());
        if let Some((row, value)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(ClassifierError::NonFiniteScore { row, value: *value });
        }
        Ok(scores)
    }
}

fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

fn softmax(scores: &Array1<f64>) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Classifier for LinearClassifier {
    fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, features: &[f64]) -> Result<i64, ClassifierError> {
        let scores = self.decision_function(features)?;
        if self.is_binary() {
            return Ok(if scores[0] > 0.0 {
                self.classes[1]
            } else {
                self.classes[0]
            });
        }

        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        Ok(self.classes[best])
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<Vec<f64>>, ClassifierError> {
        let scores = self.decision_function(features)?;
        let probabilities = if self.is_binary() {
            let positive = sigmoid(scores[0]);
            vec![1.0 - positive, positive]
        } else {
            softmax(&scores)
        };
        Ok(Some(probabilities))
    }
}
