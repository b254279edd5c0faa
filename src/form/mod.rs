// src/form/mod.rs
//! Terminal rendition of the stock status form: field parsing, interactive
//! prompts and result rendering.

pub mod prompt;
pub mod render;

pub use prompt::FormPrompter;
pub use render::render_prediction;

use std::fmt;

use crate::features::{FeatureLayout, FieldValue, RawInputRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    MalformedAssignment(String),
    UnknownField { field: String, known: Vec<String> },
    InvalidOption {
        field: String,
        value: String,
        options: Vec<String>,
    },
    InvalidNumber { field: String, value: String },
    InputClosed,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MalformedAssignment(raw) => {
                write!(f, "Expected FIELD=VALUE, got '{}'", raw)
            }
            FormError::UnknownField { field, known } => write!(
                f,
                "Unknown form field '{}'. Known fields: {}",
                field,
                known.join(", ")
            ),
            FormError::InvalidOption {
                field,
                value,
                options,
            } => write!(
                f,
                "'{}' is not a valid {}. Choose one of: {}",
                value,
                field,
                options.join(", ")
            ),
            FormError::InvalidNumber { field, value } => {
                write!(f, "'{}' is not a finite number for {}", value, field)
            }
            FormError::InputClosed => write!(f, "Input ended before the form was complete"),
        }
    }
}

impl std::error::Error for FormError {}

/// Split `field=value`, trimming whitespace around both parts.
pub fn parse_assignment(raw: &str) -> Result<(String, String), FormError> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| FormError::MalformedAssignment(raw.to_string()))?;
    let (field, value) = (field.trim(), value.trim());
    if field.is_empty() || value.is_empty() {
        return Err(FormError::MalformedAssignment(raw.to_string()));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Turn a typed answer into a form value. Categorical fields only accept their
/// declared options; numeric fields must parse to a finite number.
pub fn parse_field_value(
    layout: &FeatureLayout,
    field: &str,
    raw: &str,
) -> Result<FieldValue, FormError> {
    if let Some(categorical) = layout.field(field) {
        if categorical.accepts(raw) {
            return Ok(FieldValue::Category(raw.to_string()));
        }
        return Err(FormError::InvalidOption {
            field: field.to_string(),
            value: raw.to_string(),
            options: categorical.options.clone(),
        });
    }

    if layout.is_numeric_column(field) {
        return parse_number(field, raw).map(FieldValue::Number);
    }

    Err(FormError::UnknownField {
        field: field.to_string(),
        known: form_fields(layout),
    })
}

pub(crate) fn parse_number(field: &str, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Build a record from `field=value` assignments, as given with `--set`.
/// Fields not mentioned stay absent; later assignments replace earlier ones.
pub fn build_record<S: AsRef<str>>(
    layout: &FeatureLayout,
    assignments: &[S],
) -> Result<RawInputRecord, FormError> {
    let mut record = RawInputRecord::new();
    for assignment in assignments {
        let (field, raw) = parse_assignment(assignment.as_ref())?;
        let value = parse_field_value(layout, &field, &raw)?;
        record.set(field, value);
    }
    Ok(record)
}

/// Field names the form asks for: numeric columns, then categorical fields.
pub fn form_fields(layout: &FeatureLayout) -> Vec<String> {
    layout
        .numeric_columns()
        .map(str::to_string)
        .chain(layout.fields().iter().map(|f| f.name.clone()))
        .collect()
}
