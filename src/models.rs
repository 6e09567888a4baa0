//! Data model for extracted articles.
//!
//! - [`ArticleRecord`]: one article as the model returned it, or a sentinel
//!   describing a failure
//! - [`FieldWarning`]: a record that is missing one or more required keys
//!
//! Records are rebuilt on every request and never persisted.

use crate::error::{ExtractionError, FetchError, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Author shown for sentinel records.
pub const SENTINEL_AUTHOR: &str = "System";
/// Link placeholder used by sentinel records.
pub const SENTINEL_LINK: &str = "#";
/// Author shown on the HTML page when a record has none.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Keys every record is expected to carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "author", "link"];

/// A single article entry extracted from the homepage.
///
/// The entry is held exactly as the model produced it, so serializing a record
/// gives back the same JSON: `null` values, numbers, extra keys and even
/// entries that are not objects at all survive untouched. String views
/// ([`author`](Self::author), [`display_title`](Self::display_title), ...)
/// are read only when something needs to show the record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ArticleRecord(Value);

impl ArticleRecord {
    /// A fully populated record.
    pub fn new(title: impl Into<String>, author: impl Into<String>, link: impl Into<String>) -> Self {
        Self(json!({
            "title": title.into(),
            "author": author.into(),
            "link": link.into(),
        }))
    }

    /// A synthetic record whose title describes a failure.
    pub fn sentinel(title: impl Into<String>) -> Self {
        Self::new(title, SENTINEL_AUTHOR, SENTINEL_LINK)
    }

    pub fn is_sentinel(&self) -> bool {
        self.author() == Some(SENTINEL_AUTHOR) && self.link() == Some(SENTINEL_LINK)
    }

    /// Whether `key` is present, whatever its value (`null` included).
    pub fn has_field(&self, key: &str) -> bool {
        self.0.as_object().is_some_and(|map| map.contains_key(key))
    }

    /// Required keys absent from this record, in declaration order.
    ///
    /// An entry that is not an object has none of them.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|key| !self.has_field(key))
            .collect()
    }

    pub fn author(&self) -> Option<&str> {
        self.0.get("author").and_then(Value::as_str)
    }

    pub fn link(&self) -> Option<&str> {
        self.0.get("link").and_then(Value::as_str)
    }

    pub fn display_title(&self) -> String {
        self.text("title").unwrap_or_default()
    }

    pub fn display_author(&self) -> String {
        self.text("author").unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    // Strings as-is, other non-null values in their JSON form.
    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<Value> for ArticleRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&FetchError> for ArticleRecord {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Status(status) => {
                Self::sentinel(format!("Error fetching content: {}", status.as_u16()))
            }
            FetchError::Request(e) => Self::sentinel(format!("Error fetching URL: {e}")),
        }
    }
}

impl From<&ExtractionError> for ArticleRecord {
    fn from(err: &ExtractionError) -> Self {
        Self::sentinel(format!("Error calling completion API: {err}"))
    }
}

impl From<&ParseError> for ArticleRecord {
    fn from(err: &ParseError) -> Self {
        Self::sentinel(format!("Error: {err}"))
    }
}

/// A record that lacks one or more of [`REQUIRED_FIELDS`].
///
/// Non-fatal: the record is still served unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    /// Position of the record in the model's list.
    pub index: usize,
    pub missing: Vec<&'static str>,
}
