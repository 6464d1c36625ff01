//! Open metadata attached to organizations
//!
//! The remote store keeps organization metadata as an arbitrary JSON column.
//! It is validated once, when rows are ingested, and converted into a tagged
//! map so that consumers read typed values instead of poking at raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rejected metadata shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// The top-level value was not a JSON object
    #[error("metadata must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// JSON null
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integral number that fits in an `i64`
    Integer(i64),
    /// Any other number
    Float(f64),
    /// String value
    Text(String),
    /// Ordered list of values
    List(Vec<MetadataValue>),
    /// Nested map
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Name of the value kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for MetadataValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<MetadataValue> for serde_json::Value {
    fn from(value: MetadataValue) -> Self {
        use serde_json::Value;

        match value {
            MetadataValue::Null => Value::Null,
            MetadataValue::Bool(b) => Value::Bool(b),
            MetadataValue::Integer(i) => Value::from(i),
            MetadataValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetadataValue::Text(s) => Value::String(s),
            MetadataValue::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            MetadataValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Tagged open map of organization metadata.
///
/// Deserialization accepts a JSON object (or `null`, read as empty) and rejects
/// every other top-level shape.
///
/// # Examples
///
/// ```
/// use govern_org::Metadata;
///
/// let metadata = Metadata::try_from(serde_json::json!({
///     "description": "Default test organization",
///     "employees": 120,
/// }))
/// .unwrap();
///
/// assert_eq!(metadata.get_text("description"), Some("Default test organization"));
/// assert_eq!(metadata.get_integer("employees"), Some(120));
/// assert_eq!(metadata.get_text("employees"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for this key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Raw tagged value for a key.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Text value for a key, `None` if absent or not text.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(MetadataValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value for a key, `None` if absent or not a bool.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(MetadataValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer value for a key, `None` if absent or not integral.
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(MetadataValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value for a key; integers are widened.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(MetadataValue::Float(f)) => Some(*f),
            Some(MetadataValue::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }
}

impl TryFrom<serde_json::Value> for Metadata {
    type Error = MetadataError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::new()),
            serde_json::Value::Object(map) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, MetadataValue::from(v)))
                    .collect(),
            )),
            other => Err(MetadataError::NotAnObject(MetadataValue::from(other).kind())),
        }
    }
}

impl From<Metadata> for serde_json::Value {
    fn from(metadata: Metadata) -> Self {
        serde_json::Value::from(MetadataValue::Map(metadata.0))
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
