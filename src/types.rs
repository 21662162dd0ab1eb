//! Core value types: subjects, timestamps, attributes, and event records.

use crate::error::{BrokerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for the entity an event concerns. Must be positive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub u64);

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microseconds since Unix epoch (UTC).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_micros() as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A typed attribute riding on an event record.
///
/// Closed set of value kinds so that record contents stay statically
/// checkable; anything richer belongs in the `note` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Time(Timestamp),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl From<Timestamp> for AttributeValue {
    fn from(value: Timestamp) -> Self {
        AttributeValue::Time(value)
    }
}

/// Normalized form of a category label, used for registry keys and
/// case-insensitive comparisons. Records keep the spelling they were
/// constructed with.
pub(crate) fn category_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// An immutable description of one occurrence raised through the broker.
///
/// The timestamp is assigned at construction time, never caller-supplied.
/// `with_note` and `with_attribute` consume the record and are meant for
/// the construction phase, before the record is shared.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    subject_id: SubjectId,
    subject_name: String,
    category: String,
    note: Option<String>,
    timestamp: Timestamp,
    attributes: HashMap<String, AttributeValue>,
}

impl EventRecord {
    /// Create a record for `subject_id`/`subject_name` under `category`.
    ///
    /// The category is stored as given; lookups through the broker and the
    /// filter engine compare it case-insensitively.
    pub fn new(
        subject_id: SubjectId,
        subject_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self> {
        let subject_name = subject_name.into();
        let category = category.into();

        if subject_id.0 == 0 {
            return Err(BrokerError::InvalidSubjectId);
        }
        if subject_name.trim().is_empty() {
            return Err(BrokerError::EmptySubjectName);
        }
        if category.trim().is_empty() {
            return Err(BrokerError::EmptyCategory);
        }

        Ok(Self {
            subject_id,
            subject_name,
            category,
            note: None,
            timestamp: Timestamp::now(),
            attributes: HashMap::new(),
        })
    }

    /// Attach free-form context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attach a typed attribute, replacing any existing value for the key.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(BrokerError::EmptyAttributeKey);
        }
        self.attributes.insert(key, value.into());
        Ok(self)
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// The category label, in its original spelling.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    /// Look up a single attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Case-insensitive category comparison.
    pub fn matches_category(&self, category: &str) -> bool {
        category_key(&self.category) == category_key(category)
    }
}
