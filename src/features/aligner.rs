// src/features/aligner.rs
use log::{debug, warn};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

use crate::features::schema::{
    CategoricalField, ColumnKind, FeatureLayout, FeatureSchema, LayoutError,
};

/// A single form answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Category(value) => write!(f, "{}", value),
        }
    }
}

/// What the user entered for one submission, keyed by field name.
///
/// Entries keep their insertion order; setting a field twice replaces the earlier answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInputRecord {
    values: Vec<(String, FieldValue)>,
}

impl RawInputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        let field = field.into();
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((field, value)),
        }
    }

    pub fn with_number(mut self, field: impl Into<String>, value: f64) -> Self {
        self.set(field, FieldValue::Number(value));
        self
    }

    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, FieldValue::Category(value.into()));
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for RawInputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Model input: one value per schema column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl AlignedFeatureVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for AlignedFeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Input/schema mismatches resolved by zero-filling. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentIssue {
    /// The selected value has no one-hot column; the field contributes nothing.
    UnknownCategory { field: String, value: String },
    MissingCategory { field: String },
    MissingNumeric { column: String },
    /// Input field that is neither a numeric column nor a declared categorical field.
    UnexpectedField { field: String },
    CategoryForNumeric { column: String },
    NumberForCategory { field: String },
}

impl fmt::Display for AlignmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentIssue::UnknownCategory { field, value } => write!(
                f,
                "'{}' selected for '{}' has no schema column; field contributes no signal",
                value, field
            ),
            AlignmentIssue::MissingCategory { field } => {
                write!(f, "no selection for '{}'; all its columns set to 0", field)
            }
            AlignmentIssue::MissingNumeric { column } => {
                write!(f, "no value for '{}'; set to 0", column)
            }
            AlignmentIssue::UnexpectedField { field } => {
                write!(f, "'{}' is not part of the feature schema; ignored", field)
            }
            AlignmentIssue::CategoryForNumeric { column } => {
                write!(f, "'{}' expects a number but got a selection; set to 0", column)
            }
            AlignmentIssue::NumberForCategory { field } => write!(
                f,
                "'{}' expects a selection but got a number; all its columns set to 0",
                field
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub vector: AlignedFeatureVector,
    pub issues: Vec<AlignmentIssue>,
}

/// Rebuild the training-time feature vector from one raw input record.
///
/// Numeric columns copy the user's value, each categorical field sets exactly
/// the column for its selection to 1, and every other schema column is 0.
/// The result has exactly the schema's columns in the schema's order.
pub fn align(raw_input: &RawInputRecord, layout: &FeatureLayout) -> Alignment {
    let schema = layout.schema();
    let mut values = vec![0.0; schema.len()];
    let mut issues = Vec::new();

    for (name, value) in raw_input.iter() {
        if let Some(field) = layout.field(name) {
            match value {
                FieldValue::Category(selected) => {
                    match layout.one_hot_position(&field.name, selected) {
                        Some(position) => values[position] = 1.0,
                        None => issues.push(AlignmentIssue::UnknownCategory {
                            field: field.name.clone(),
                            value: selected.clone(),
                        }),
                    }
                }
                FieldValue::Number(_) => issues.push(AlignmentIssue::NumberForCategory {
                    field: field.name.clone(),
                }),
            }
            continue;
        }

        let numeric_position = layout
            .position(name)
            .filter(|p| layout.kind(*p) == Some(&ColumnKind::Numeric));
        match (numeric_position, value) {
            (Some(position), FieldValue::Number(number)) => values[position] = *number,
            (Some(_), FieldValue::Category(_)) => {
                issues.push(AlignmentIssue::CategoryForNumeric {
                    column: name.to_string(),
                })
            }
            (None, _) => issues.push(AlignmentIssue::UnexpectedField {
                field: name.to_string(),
            }),
        }
    }

    for field in layout.fields() {
        if !raw_input.contains(&field.name) {
            issues.push(AlignmentIssue::MissingCategory {
                field: field.name.clone(),
            });
        }
    }
    for column in layout.numeric_columns() {
        if !raw_input.contains(column) {
            issues.push(AlignmentIssue::MissingNumeric {
                column: column.to_string(),
            });
        }
    }

    for issue in &issues {
        warn!("Feature alignment: {}", issue);
    }

    let vector = AlignedFeatureVector {
        columns: schema.columns().to_vec(),
        values,
    };
    debug!("Aligned feature vector: {:?}", vector.iter().collect::<Vec<_>>());

    Alignment { vector, issues }
}

/// `align` for callers holding a bare schema and field list.
pub fn align_with_fields(
    raw_input: &RawInputRecord,
    schema: &FeatureSchema,
    categorical_fields: &[CategoricalField],
) -> Result<Alignment, LayoutError> {
    let layout = FeatureLayout::new(schema.clone(), categorical_fields.to_vec())?;
    Ok(align(raw_input, &layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::stock_categorical_fields;

    fn season_layout() -> FeatureLayout {
        FeatureLayout::new(
            FeatureSchema::new(["qty", "season_peak", "season_off-peak"]),
            vec![CategoricalField::new("season", &["peak", "off-peak"])],
        )
        .unwrap()
    }

    fn stock_layout() -> FeatureLayout {
        FeatureLayout::new(
            FeatureSchema::new([
                "current_stock",
                "item_category_non-essential",
                "avg_daily_sales",
                "season_off-peak",
                "supplier_reliability_high",
                "lead_time_days",
                "season_peak",
                "item_category_essential",
                "supplier_reliability_low",
            ]),
            stock_categorical_fields(),
        )
        .unwrap()
    }

    fn full_stock_input() -> RawInputRecord {
        RawInputRecord::new()
            .with_category("supplier_reliability", "low")
            .with_number("lead_time_days", 7.0)
            .with_category("season", "off-peak")
            .with_number("current_stock", 120.0)
            .with_category("item_category", "essential")
            .with_number("avg_daily_sales", 14.5)
    }

    #[test]
    fn test_single_field_scenario() {
        let input = RawInputRecord::new()
            .with_number("qty", 10.0)
            .with_category("season", "peak");
        let Alignment { vector, issues } = align(&input, &season_layout());

        assert_eq!(vector.columns(), &["qty", "season_peak", "season_off-peak"]);
        assert_eq!(vector.values(), &[10.0, 1.0, 0.0]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_output_follows_schema_order() {
        let layout = stock_layout();
        let Alignment { vector, issues } = align(&full_stock_input(), &layout);

        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert_eq!(vector.columns(), layout.schema().columns());
        assert_eq!(
            vector.values(),
            &[120.0, 0.0, 14.5, 1.0, 0.0, 7.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_exactly_one_hot_per_field() {
        let layout = stock_layout();
        let Alignment { vector, .. } = align(&full_stock_input(), &layout);

        for field in layout.fields() {
            let ones = layout
                .one_hot_columns(&field.name)
                .iter()
                .filter(|column| vector.get(column) == Some(1.0))
                .count();
            assert_eq!(ones, 1, "field {} should have exactly one active column", field.name);
        }
    }

    #[test]
    fn test_numeric_values_copied_unmodified() {
        let input = RawInputRecord::new()
            .with_number("qty", -3.25)
            .with_category("season", "off-peak");
        let Alignment { vector, .. } = align(&input, &season_layout());
        assert_eq!(vector.get("qty"), Some(-3.25));
    }

    #[test]
    fn test_unknown_selection_contributes_nothing() {
        let input = RawInputRecord::new()
            .with_number("qty", 4.0)
            .with_category("season", "monsoon");
        let Alignment { vector, issues } = align(&input, &season_layout());

        assert_eq!(vector.len(), 3);
        assert_eq!(vector.get("season_monsoon"), None);
        assert_eq!(vector.values(), &[4.0, 0.0, 0.0]);
        assert_eq!(
            issues,
            vec![AlignmentIssue::UnknownCategory {
                field: "season".to_string(),
                value: "monsoon".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_and_unexpected_inputs_are_reported() {
        let input = RawInputRecord::new().with_number("shelf_life", 30.0);
        let Alignment { vector, issues } = align(&input, &season_layout());

        assert_eq!(vector.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(
            issues,
            vec![
                AlignmentIssue::UnexpectedField {
                    field: "shelf_life".to_string()
                },
                AlignmentIssue::MissingCategory {
                    field: "season".to_string()
                },
                AlignmentIssue::MissingNumeric {
                    column: "qty".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_wrong_value_kinds_are_zero_filled() {
        let input = RawInputRecord::new()
            .with_category("qty", "peak")
            .with_number("season", 1.0);
        let Alignment { vector, issues } = align(&input, &season_layout());

        assert_eq!(vector.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(
            issues,
            vec![
                AlignmentIssue::CategoryForNumeric {
                    column: "qty".to_string()
                },
                AlignmentIssue::NumberForCategory {
                    field: "season".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_one_hot_column_name_is_not_a_numeric_input() {
        let input = RawInputRecord::new()
            .with_number("qty", 1.0)
            .with_number("season_off-peak", 1.0)
            .with_category("season", "peak");
        let Alignment { vector, issues } = align(&input, &season_layout());

        assert_eq!(vector.values(), &[1.0, 1.0, 0.0]);
        assert_eq!(
            issues,
            vec![AlignmentIssue::UnexpectedField {
                field: "season_off-peak".to_string()
            }]
        );
    }

    #[test]
    fn test_later_answer_replaces_earlier() {
        let mut input = RawInputRecord::new().with_category("season", "peak");
        input.set("season", FieldValue::Category("off-peak".to_string()));
        assert_eq!(input.len(), 1);

        let Alignment { vector, .. } = align(&input, &season_layout());
        assert_eq!(vector.get("season_peak"), Some(0.0));
        assert_eq!(vector.get("season_off-peak"), Some(1.0));
    }

    #[test]
    fn test_align_with_fields_builds_layout() {
        let schema = FeatureSchema::new(["qty", "season_peak", "season_off-peak"]);
        let fields = vec![CategoricalField::new("season", &["peak", "off-peak"])];
        let input = RawInputRecord::new()
            .with_number("qty", 2.0)
            .with_category("season", "off-peak");

        let alignment = align_with_fields(&input, &schema, &fields).unwrap();
        assert_eq!(alignment.vector.values(), &[2.0, 0.0, 1.0]);

        let duplicate = FeatureSchema::new(["qty", "qty"]);
        assert!(align_with_fields(&input, &duplicate, &fields).is_err());
    }

    #[test]
    fn test_vector_serializes_in_schema_order() {
        let input = RawInputRecord::new()
            .with_number("qty", 10.0)
            .with_category("season", "peak");
        let Alignment { vector, .. } = align(&input, &season_layout());

        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"qty":10.0,"season_peak":1.0,"season_off-peak":0.0}"#);
        let echoed = serde_json::to_string(&input).unwrap();
        assert_eq!(echoed, r#"{"qty":10.0,"season":"peak"}"#);
    }
}
