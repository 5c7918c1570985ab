//! Labelled records and the ingestion-time label normalization.
//!
//! The `assigned_label` column is persisted inconsistently: sometimes as a
//! real JSON array, sometimes as a string holding an array literal, and
//! occasionally as a string using single quotes instead of double quotes.
//! [`LabelField`] captures that union exactly as read from the record
//! store; [`RawRecord::normalize`] collapses it into a [`Record`] whose
//! labels are a plain ordered list of trimmed strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LabelParseError;

/// The label column as it was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelField {
    /// A genuine JSON array. Non-string elements are dropped.
    Structured(Vec<String>),
    /// A string that has to be parsed as a JSON array.
    Raw(String),
    /// Null, absent, or a JSON type that cannot hold labels.
    Missing,
}

impl LabelField {
    /// Classify a JSON column value.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => LabelField::Structured(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(s) => LabelField::Raw(s),
            _ => LabelField::Missing,
        }
    }

    /// Parse into an ordered list of trimmed, non-blank labels.
    pub fn parse(&self) -> Result<Vec<String>, LabelParseError> {
        match self {
            LabelField::Structured(labels) => Ok(clean_labels(labels.iter().map(String::as_str))),
            LabelField::Raw(text) => parse_label_text(text),
            LabelField::Missing => Ok(Vec::new()),
        }
    }

    /// Permissive variant of [`LabelField::parse`]: failures become "no labels".
    pub fn labels(&self) -> Vec<String> {
        self.parse().unwrap_or_default()
    }
}

impl From<Value> for LabelField {
    fn from(value: Value) -> Self {
        LabelField::from_json(value)
    }
}

/// Parse a stored label string.
///
/// The text is first tried as strict JSON, so payloads whose labels contain
/// apostrophes survive untouched. Only if that fails are single quotes
/// swapped for double quotes and the parse retried.
pub fn parse_label_text(text: &str) -> Result<Vec<String>, LabelParseError> {
    if text.trim().is_empty() {
        return Err(LabelParseError::Blank);
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => serde_json::from_str::<Value>(&text.replace('\'', "\"")).map_err(|e| {
            LabelParseError::InvalidJson {
                reason: e.to_string(),
            }
        })?,
    };

    match value {
        Value::Array(items) => Ok(clean_labels(items.iter().filter_map(Value::as_str))),
        _ => Err(LabelParseError::NotAnArray),
    }
}

fn clean_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    labels
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// A row exactly as projected from the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub state: String,
    pub assigned_label: LabelField,
}

impl RawRecord {
    pub fn new(state: impl Into<String>, assigned_label: impl Into<LabelField>) -> Self {
        Self {
            state: state.into(),
            assigned_label: assigned_label.into(),
        }
    }

    /// Collapse the label union. Unparsable payloads yield a label-less record.
    pub fn normalize(self) -> Record {
        let labels = self.assigned_label.labels();
        Record {
            state: self.state,
            labels,
        }
    }
}

/// A normalized record: a state and its ordered, trimmed labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Record {
    pub state: String,
    #[serde(rename = "assigned_label")]
    pub labels: Vec<String>,
}

impl Record {
    /// Build a record from already-structured labels, trimming as on ingestion.
    pub fn new<I, S>(state: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        Self {
            state: state.into(),
            labels,
        }
    }
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        raw.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_labels_used_as_is() {
        let field = LabelField::from_json(json!(["Health", " Crime "]));
        assert_eq!(field.labels(), vec!["Health", "Crime"]);
    }

    #[test]
    fn test_structured_drops_non_strings() {
        let field = LabelField::from_json(json!(["Health", 3, null, {"a": 1}]));
        assert_eq!(field.labels(), vec!["Health"]);
    }

    #[test]
    fn test_json_string_parsed() {
        let field = LabelField::from_json(json!("[\"Health\", \"Crime\"]"));
        assert_eq!(field.labels(), vec!["Health", "Crime"]);
    }

    #[test]
    fn test_single_quoted_string_parsed() {
        let single = LabelField::Raw("['Health', 'Crime']".to_string());
        let double = LabelField::Structured(vec!["Health".to_string(), "Crime".to_string()]);
        assert_eq!(single.labels(), double.labels());
    }

    #[test]
    fn test_apostrophe_in_valid_json_survives() {
        let field = LabelField::Raw("[\"Children's Health\"]".to_string());
        assert_eq!(field.labels(), vec!["Children's Health"]);
    }

    #[test]
    fn test_unparsable_string_is_error_then_empty() {
        let field = LabelField::Raw("Health, Crime".to_string());
        assert!(matches!(
            field.parse(),
            Err(LabelParseError::InvalidJson { .. })
        ));
        assert!(field.labels().is_empty());
    }

    #[test]
    fn test_blank_string() {
        let field = LabelField::Raw("   ".to_string());
        assert_eq!(field.parse(), Err(LabelParseError::Blank));
        assert!(field.labels().is_empty());
    }

    #[test]
    fn test_non_array_json_string() {
        let field = LabelField::Raw("\"Health\"".to_string());
        assert_eq!(field.parse(), Err(LabelParseError::NotAnArray));
    }

    #[test]
    fn test_missing_variants() {
        assert_eq!(LabelField::from_json(Value::Null), LabelField::Missing);
        assert_eq!(LabelField::from_json(json!(42)), LabelField::Missing);
        assert!(LabelField::Missing.labels().is_empty());
    }

    #[test]
    fn test_raw_record_normalize() {
        let record = RawRecord::new("CA", json!("['Health']")).normalize();
        assert_eq!(record, Record::new("CA", ["Health"]));
    }

    #[test]
    fn test_record_serializes_with_column_name() -> Result<(), serde_json::Error> {
        let record = Record::new("TX", ["Crime"]);
        let value = serde_json::to_value(&record)?;
        assert_eq!(value, json!({"state": "TX", "assigned_label": ["Crime"]}));
        Ok(())
    }
}
