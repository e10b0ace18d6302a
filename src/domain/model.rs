use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FIELD_ID: &str = "_id";
pub const FIELD_LINK: &str = "link";
pub const FIELD_DATE_MODIFIED: &str = "date_modified";
pub const FIELD_AVAILABLE: &str = "available";

/// Opaque listing identifier: a URL or a provider-native key, stable across
/// runs and unique within a provider's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Scalar or nested value of a listing field. Untagged so the wire format
/// stays plain JSON; timestamps serialize as RFC 3339 strings and are tried
/// before plain strings on the way back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<FixedOffset>),
    String(String),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Converts a parsed JSON value, returning `None` for JSON null so
    /// absent provider fields are dropped rather than stored. Strings in
    /// RFC 3339 form become timestamps, mirroring how the untagged
    /// representation reads them back from the store; anything else would
    /// break field-for-field comparison after a round trip.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(ts) => Some(Self::Timestamp(ts)),
                Err(_) => Some(Self::String(s)),
            },
            serde_json::Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            serde_json::Value::Object(entries) => Some(Self::Map(
                entries
                    .into_iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect(),
            )),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(ts)
    }
}

/// A flat listing record: an ordered field map produced by a provider.
/// Fields other than the annotated ones are provider-specific and pass
/// through unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Listing {
    fields: IndexMap<String, FieldValue>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// String rendering of the `_id` field, used as the store key. Integer
    /// ids (olx) render in decimal.
    pub fn id_str(&self) -> Option<String> {
        match self.fields.get(FIELD_ID)? {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn date_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.fields.get(FIELD_DATE_MODIFIED)?.as_timestamp()
    }

    /// Stamps the record before upsert: `date_modified`, `link`, and
    /// `available` are always set; `_id` only when the provider did not
    /// supply one.
    pub fn annotate(&mut self, id: &ListingId, modified_at: DateTime<FixedOffset>) {
        self.insert(FIELD_DATE_MODIFIED, modified_at);
        self.insert(FIELD_LINK, id.as_str());
        self.insert(FIELD_AVAILABLE, true);
        if !self.contains(FIELD_ID) {
            self.insert(FIELD_ID, id.as_str());
        }
    }
}
