// src/model/label_map.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMapError {
    Empty,
    DuplicateLabel(String),
    DuplicateCode {
        code: i64,
        first: String,
        second: String,
    },
    UnknownCode(i64),
    UnknownLabel(String),
}

impl fmt::Display for LabelMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMapError::Empty => write!(f, "Label map contains no labels"),
            LabelMapError::DuplicateLabel(label) => {
                write!(f, "Label '{}' appears more than once in the label map", label)
            }
            LabelMapError::DuplicateCode {
                code,
                first,
                second,
            } => write!(
                f,
                "Class code {} is mapped to both '{}' and '{}'",
                code, first, second
            ),
            LabelMapError::UnknownCode(code) => {
                write!(f, "Classifier produced class code {} which has no label", code)
            }
            LabelMapError::UnknownLabel(label) => write!(f, "Unknown label '{}'", label),
        }
    }
}

impl std::error::Error for LabelMapError {}

/// Status name <-> class code lookup. Always a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct LabelMap {
    by_label: BTreeMap<String, i64>,
    by_code: BTreeMap<i64, String>,
}

impl LabelMap {
    pub fn new<I, S>(entries: I) -> Result<Self, LabelMapError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut by_label = BTreeMap::new();
        let mut by_code: BTreeMap<i64, String> = BTreeMap::new();

        for (label, code) in entries {
            let label = label.into();
            if by_label.contains_key(&label) {
                return Err(LabelMapError::DuplicateLabel(label));
            }
            if let Some(first) = by_code.get(&code) {
                return Err(LabelMapError::DuplicateCode {
                    code,
                    first: first.clone(),
                    second: label,
                });
            }
            by_code.insert(code, label.clone());
            by_label.insert(label, code);
        }

        if by_label.is_empty() {
            return Err(LabelMapError::Empty);
        }
        Ok(Self { by_label, by_code })
    }

    pub fn encode(&self, label: &str) -> Result<i64, LabelMapError> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| LabelMapError::UnknownLabel(label.to_string()))
    }

    pub fn decode(&self, code: i64) -> Result<&str, LabelMapError> {
        self.by_code
            .get(&code)
            .map(String::as_str)
            .ok_or(LabelMapError::UnknownCode(code))
    }

    pub fn contains_code(&self, code: i64) -> bool {
        self.by_code.contains_key(&code)
    }

    /// Labels ordered by class code.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_code.values().map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_code.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl TryFrom<BTreeMap<String, i64>> for LabelMap {
    type Error = LabelMapError;

    fn try_from(entries: BTreeMap<String, i64>) -> Result<Self, Self::Error> {
        LabelMap::new(entries)
    }
}

impl From<LabelMap> for BTreeMap<String, i64> {
    fn from(map: LabelMap) -> Self {
        map.by_label
    }
}
