// src/model/mod.rs
pub mod classifier;
pub mod label_map;

pub use classifier::{Classifier, ClassifierError, LinearClassifier, LinearModelFile};
pub use label_map::{LabelMap, LabelMapError};
