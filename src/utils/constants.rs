// src/utils/constants.rs

/// Directory searched for model artifacts when nothing else is configured.
pub const DEFAULT_ARTIFACTS_DIR: &str = ".";

pub const DEFAULT_MODEL_FILE: &str = "lr_model.json";
pub const DEFAULT_LABEL_MAP_FILE: &str = "label_map.json";
pub const DEFAULT_FEATURE_NAMES_FILE: &str = "feature_names.json";

/// Fields that were one-hot encoded before training, with their closed option sets.
/// The first option is the form's default selection.
pub const STOCK_CATEGORICAL_FIELDS: &[(&str, &[&str])] = &[
    ("season", &["peak", "off-peak"]),
    ("item_category", &["essential", "non-essential"]),
    ("supplier_reliability", &["high", "low"]),
];
