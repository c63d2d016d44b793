//! Typed metadata attached to documents and chunk vectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MetadataError;

/// A metadata value accepted by the vector store payload.
///
/// The external API silently coerces anything else, so the value space is
/// restricted to strings, numbers, and booleans up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        MetadataValue::Number(value as f64)
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Number(f64::from(value))
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Ordered key-value metadata map.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Parse a JSON object string into a [`Metadata`] map.
///
/// Nested arrays, objects, and nulls are rejected rather than coerced.
pub fn parse_metadata(json: &str) -> Result<Metadata, MetadataError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(map) = value else {
        return Err(MetadataError::NotAnObject);
    };

    let mut metadata = Metadata::new();
    for (key, value) in map {
        let value = match value {
            Value::Bool(b) => MetadataValue::Bool(b),
            Value::Number(n) => {
                let n = n.as_f64().ok_or_else(|| MetadataError::UnsupportedValue {
                    key: key.clone(),
                    kind: "number out of range",
                })?;
                MetadataValue::Number(n)
            }
            Value::String(s) => MetadataValue::String(s),
            Value::Null => {
                return Err(MetadataError::UnsupportedValue { key, kind: "null" });
            }
            Value::Array(_) => {
                return Err(MetadataError::UnsupportedValue { key, kind: "array" });
            }
            Value::Object(_) => {
                return Err(MetadataError::UnsupportedValue { key, kind: "object" });
            }
        };
        metadata.insert(key, value);
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_object() {
        let metadata = parse_metadata(r#"{"source": "manual", "pages": 12, "draft": false}"#)
            .expect("valid metadata");
        assert_eq!(metadata["source"], MetadataValue::String("manual".into()));
        assert_eq!(metadata["pages"], MetadataValue::Number(12.0));
        assert_eq!(metadata["draft"], MetadataValue::Bool(false));
    }

    #[test]
    fn test_reject_non_object() {
        assert!(matches!(
            parse_metadata(r#"["a", "b"]"#),
            Err(MetadataError::NotAnObject)
        ));
        assert!(matches!(
            parse_metadata(r#""just a string""#),
            Err(MetadataError::NotAnObject)
        ));
    }

    #[test]
    fn test_reject_nested_values() {
        let err = parse_metadata(r#"{"tags": ["a", "b"]}"#).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedValue { kind: "array", .. }
        ));

        let err = parse_metadata(r#"{"inner": {"k": "v"}}"#).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedValue { kind: "object", .. }
        ));

        let err = parse_metadata(r#"{"missing": null}"#).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedValue { kind: "null", .. }
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_metadata("{not json"),
            Err(MetadataError::ParseError(_))
        ));
    }

    #[test]
    fn test_serialization_round_trip() {
        let metadata = parse_metadata(r#"{"category": "farming", "score": 0.5}"#).unwrap();
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"category":"farming","score":0.5}"#);
    }
}
