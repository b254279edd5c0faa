// src/features/schema.rs
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::utils::constants::STOCK_CATEGORICAL_FIELDS;

/// The ordered column list the classifier was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A closed-set input that was one-hot encoded as `<name>_<option>` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalField {
    pub name: String,
    pub options: Vec<String>,
}

impl CategoricalField {
    pub fn new(name: impl Into<String>, options: &[&str]) -> Self {
        Self {
            name: name.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn column_name(&self, value: &str) -> String {
        format!("{}_{}", self.name, value)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    /// Human-readable label, e.g. `item_category` -> `item category`.
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// The categorical inputs of the stock status form.
pub fn stock_categorical_fields() -> Vec<CategoricalField> {
    STOCK_CATEGORICAL_FIELDS
        .iter()
        .map(|(name, options)| CategoricalField::new(*name, options))
        .collect()
}

/// Fatal problems with the schema or the field declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptySchema,
    DuplicateColumn(String),
    DuplicateField(String),
    FieldWithoutOptions(String),
    /// A categorical field shares its name with a schema column, so the
    /// answer could feed either one.
    FieldShadowsColumn(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::EmptySchema => write!(f, "Feature schema contains no columns"),
            LayoutError::DuplicateColumn(column) => {
                write!(f, "Feature schema lists column '{}' more than once", column)
            }
            LayoutError::DuplicateField(field) => {
                write!(f, "Categorical field '{}' is declared more than once", field)
            }
            LayoutError::FieldWithoutOptions(field) => {
                write!(f, "Categorical field '{}' has no options", field)
            }
            LayoutError::FieldShadowsColumn(field) => write!(
                f,
                "Categorical field '{}' has the same name as a feature schema column",
                field
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Mismatches between the declared form and the trained schema that do not stop startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// A selectable option has no one-hot column, so choosing it carries no signal.
    OptionWithoutColumn { field: String, value: String },
    /// A one-hot column whose value the form can never select.
    ColumnWithoutOption { field: String, column: String },
    /// A declared field with no one-hot columns in the schema at all.
    FieldWithoutColumns { field: String },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::OptionWithoutColumn { field, value } => write!(
                f,
                "option '{}' of field '{}' has no column in the feature schema",
                value, field
            ),
            LayoutWarning::ColumnWithoutOption { field, column } => write!(
                f,
                "schema column '{}' is not a selectable option of field '{}'",
                column, field
            ),
            LayoutWarning::FieldWithoutColumns { field } => write!(
                f,
                "field '{}' has no one-hot columns in the feature schema",
                field
            ),
        }
    }
}

/// What feeds a schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    /// Index into the layout's fields plus the encoded value.
    OneHot { field: usize, value: String },
}

/// Assign a column to a categorical field or mark it numeric.
///
/// A column belongs to field `f` when it reads `f_<value>` with a non-empty value.
/// If several fields match, the longest field name wins, so `item_category_x`
/// goes to `item_category` even when `item` is also declared.
pub fn classify_column(column: &str, fields: &[CategoricalField]) -> ColumnKind {
    fields
        .iter()
        .enumerate()
        .filter_map(|(idx, field)| {
            column
                .strip_prefix(field.name.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|value| !value.is_empty())
                .map(|value| (idx, field.name.len(), value))
        })
        .max_by_key(|(_, name_len, _)| *name_len)
        .map(|(field, _, value)| ColumnKind::OneHot {
            field,
            value: value.to_string(),
        })
        .unwrap_or(ColumnKind::Numeric)
}

/// The schema partitioned into numeric and one-hot columns, built once at startup.
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    schema: FeatureSchema,
    fields: Vec<CategoricalField>,
    kinds: Vec<ColumnKind>,
    index: HashMap<String, usize>,
    warnings: Vec<LayoutWarning>,
}

impl FeatureLayout {
    pub fn new(schema: FeatureSchema, fields: Vec<CategoricalField>) -> Result<Self, LayoutError> {
        if schema.is_empty() {
            return Err(LayoutError::EmptySchema);
        }

        let mut index = HashMap::with_capacity(schema.len());
        for (position, column) in schema.columns().iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(LayoutError::DuplicateColumn(column.clone()));
            }
        }

        {
            let mut seen = HashSet::new();
            for field in &fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(LayoutError::DuplicateField(field.name.clone()));
                }
                if field.options.is_empty() {
                    return Err(LayoutError::FieldWithoutOptions(field.name.clone()));
                }
                if index.contains_key(&field.name) {
                    return Err(LayoutError::FieldShadowsColumn(field.name.clone()));
                }
            }
        }

        let kinds: Vec<ColumnKind> = schema
            .columns()
            .iter()
            .map(|column| classify_column(column, &fields))
            .collect();

        let mut layout = Self {
            schema,
            fields,
            kinds,
            index,
            warnings: Vec::new(),
        };
        layout.warnings = layout.find_mismatches();
        Ok(layout)
    }

    fn find_mismatches(&self) -> Vec<LayoutWarning> {
        let mut warnings = Vec::new();
        for (field_idx, field) in self.fields.iter().enumerate() {
            let columns: Vec<(&str, &str)> = self
                .schema
                .columns()
                .iter()
                .zip(&self.kinds)
                .filter_map(|(column, kind)| match kind {
                    ColumnKind::OneHot { field: owner, value } if *owner == field_idx => {
                        Some((column.as_str(), value.as_str()))
                    }
                    _ => None,
                })
                .collect();

            if columns.is_empty() {
                warnings.push(LayoutWarning::FieldWithoutColumns {
                    field: field.name.clone(),
                });
                continue;
            }

            for option in &field.options {
                if !columns.iter().any(|(_, value)| *value == option.as_str()) {
                    warnings.push(LayoutWarning::OptionWithoutColumn {
                        field: field.name.clone(),
                        value: option.clone(),
                    });
                }
            }
            for (column, value) in &columns {
                if !field.accepts(value) {
                    warnings.push(LayoutWarning::ColumnWithoutOption {
                        field: field.name.clone(),
                        column: column.to_string(),
                    });
                }
            }
        }
        warnings
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn fields(&self) -> &[CategoricalField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CategoricalField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn kind(&self, position: usize) -> Option<&ColumnKind> {
        self.kinds.get(position)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.position(column)
            .and_then(|p| self.kind(p))
            .map_or(false, |kind| *kind == ColumnKind::Numeric)
    }

    /// Numeric columns in schema order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.schema
            .columns()
            .iter()
            .zip(&self.kinds)
            .filter(|(_, kind)| **kind == ColumnKind::Numeric)
            .map(|(column, _)| column.as_str())
    }

    /// One-hot columns of `field_name` in schema order.
    pub fn one_hot_columns(&self, field_name: &str) -> Vec<&str> {
        let Some(field_idx) = self.fields.iter().position(|f| f.name == field_name) else {
            return Vec::new();
        };
        self.schema
            .columns()
            .iter()
            .zip(&self.kinds)
            .filter(|(_, kind)| matches!(kind, ColumnKind::OneHot { field, .. } if *field == field_idx))
            .map(|(column, _)| column.as_str())
            .collect()
    }

    /// Schema position of the column encoding `value` for `field_name`, if the
    /// schema has one.
    pub fn one_hot_position(&self, field_name: &str, value: &str) -> Option<usize> {
        let field_idx = self.fields.iter().position(|f| f.name == field_name)?;
        let position = self.position(&self.fields[field_idx].column_name(value))?;
        match self.kind(position)? {
            ColumnKind::OneHot { field, .. } if *field == field_idx => Some(position),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub fn log_summary(&self) {
        info!(
            "Feature layout: {} columns ({} numeric, {} categorical fields)",
            self.schema.len(),
            self.numeric_columns().count(),
            self.fields.len()
        );
        for warning in &self.warnings {
            warn!("⚠️ Schema mismatch: {}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season_field() -> CategoricalField {
        CategoricalField::new("season", &["peak", "off-peak"])
    }

    #[test]
    fn test_partition_numeric_and_one_hot() {
        let schema = FeatureSchema::new(["qty", "season_peak", "season_off-peak", "lead_time"]);
        let layout = FeatureLayout::new(schema, vec![season_field()]).unwrap();

        assert_eq!(layout.numeric_columns().collect::<Vec<_>>(), vec!["qty", "lead_time"]);
        assert_eq!(
            layout.one_hot_columns("season"),
            vec!["season_peak", "season_off-peak"]
        );
        assert!(layout.warnings().is_empty());
    }

    #[test]
    fn test_longest_field_prefix_wins() {
        let fields = vec![
            CategoricalField::new("item", &["a"]),
            CategoricalField::new("item_category", &["essential"]),
        ];
        assert_eq!(
            classify_column("item_category_essential", &fields),
            ColumnKind::OneHot {
                field: 1,
                value: "essential".to_string()
            }
        );
        assert_eq!(
            classify_column("item_a", &fields),
            ColumnKind::OneHot {
                field: 0,
                value: "a".to_string()
            }
        );
    }

    #[test]
    fn test_prefix_needs_separator_and_value() {
        let fields = vec![season_field()];
        assert_eq!(classify_column("seasonality", &fields), ColumnKind::Numeric);
        assert_eq!(classify_column("season_", &fields), ColumnKind::Numeric);
        assert_eq!(classify_column("season", &fields), ColumnKind::Numeric);
    }

    #[test]
    fn test_rejects_duplicate_and_empty_schemas() {
        let empty = FeatureLayout::new(FeatureSchema::new(Vec::<String>::new()), vec![]);
        assert_eq!(empty.unwrap_err(), LayoutError::EmptySchema);

        let duplicated = FeatureLayout::new(FeatureSchema::new(["qty", "qty"]), vec![]);
        assert_eq!(
            duplicated.unwrap_err(),
            LayoutError::DuplicateColumn("qty".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_field_declarations() {
        let schema = FeatureSchema::new(["qty"]);
        let twice = FeatureLayout::new(schema.clone(), vec![season_field(), season_field()]);
        assert_eq!(
            twice.unwrap_err(),
            LayoutError::DuplicateField("season".to_string())
        );

        let no_options = FeatureLayout::new(schema, vec![CategoricalField::new("season", &[])]);
        assert_eq!(
            no_options.unwrap_err(),
            LayoutError::FieldWithoutOptions("season".to_string())
        );
    }

    #[test]
    fn test_rejects_field_named_like_a_column() {
        let schema = FeatureSchema::new(["season", "season_peak", "season_off-peak"]);
        let result = FeatureLayout::new(schema, vec![season_field()]);
        assert_eq!(
            result.unwrap_err(),
            LayoutError::FieldShadowsColumn("season".to_string())
        );
    }

    #[test]
    fn test_reports_schema_drift() {
        let schema = FeatureSchema::new(["qty", "season_peak", "season_winter"]);
        let fields = vec![
            season_field(),
            CategoricalField::new("supplier_reliability", &["high", "low"]),
        ];
        let layout = FeatureLayout::new(schema, fields).unwrap();

        assert_eq!(
            layout.warnings(),
            &[
                LayoutWarning::OptionWithoutColumn {
                    field: "season".to_string(),
                    value: "off-peak".to_string()
                },
                LayoutWarning::ColumnWithoutOption {
                    field: "season".to_string(),
                    column: "season_winter".to_string()
                },
                LayoutWarning::FieldWithoutColumns {
                    field: "supplier_reliability".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_one_hot_position_lookup() {
        let schema = FeatureSchema::new(["qty", "season_peak", "season_off-peak"]);
        let layout = FeatureLayout::new(schema, vec![season_field()]).unwrap();

        assert_eq!(layout.one_hot_position("season", "off-peak"), Some(2));
        assert_eq!(layout.one_hot_position("season", "winter"), None);
        assert_eq!(layout.one_hot_position("weather", "peak"), None);
        assert!(layout.is_numeric_column("qty"));
        assert!(!layout.is_numeric_column("season_peak"));
    }

    #[test]
    fn test_stock_fields_match_form_options() {
        let fields = stock_categorical_fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["season", "item_category", "supplier_reliability"]);
        assert!(fields[1].accepts("non-essential"));
        assert_eq!(fields[1].label(), "item category");
    }
}
