// src/features/mod.rs
pub mod aligner;
pub mod schema;

pub use aligner::{
    align, align_with_fields, AlignedFeatureVector, Alignment, AlignmentIssue, FieldValue,
    RawInputRecord,
};
pub use schema::{
    stock_categorical_fields, CategoricalField, FeatureLayout, FeatureSchema, LayoutError,
    LayoutWarning,
};
