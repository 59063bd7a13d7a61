//! Records, linked documents and payloads as read from the backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque, non-empty record identifier. Format validity is left to the data service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

/// Returned by `RecordId::parse` for empty or whitespace-only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record id must not be empty")]
pub struct InvalidRecordId;

impl RecordId {
    pub fn parse(raw: &str) -> Result<Self, InvalidRecordId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidRecordId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Top-level entity with its first-level linked documents, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opaque_string_opt")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub linked_documents: Vec<LinkedDocument>,
}

/// Metadata of an uploaded file. The bytes live in the object store under `storage_path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedDocument {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl LinkedDocument {
    /// Storage path exactly as stored, unless missing or blank.
    pub fn usable_storage_path(&self) -> Option<&str> {
        self.storage_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Content-Type assumed when the object store does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Bytes fetched from the object store. Lives only for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub size: u64,
    pub content_type: String,
}

impl Payload {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            size: bytes.len() as u64,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes,
        }
    }
}

fn opaque_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opaque_string_opt(d)?.ok_or_else(|| serde::de::Error::custom("id must not be null"))
}

/// Accept strings and numbers (ids and statuses are opaque to us).
fn opaque_string_opt<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// A to-one embed comes back as an object or null; to-many as an array.
fn one_or_many<'de, D>(d: D) -> Result<Vec<LinkedDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<LinkedDocument>),
        One(LinkedDocument),
    }

    Ok(match Option::<OneOrMany>::deserialize(d)? {
        None => Vec::new(),
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::One(doc)) => vec![doc],
    })
}
