//! # Domain Model
//!
//! A [`Note`] is a titled text record with an opaque id and two timestamps. The full
//! set of notes is persisted and exported inside an [`Envelope`]:
//!
//! ```text
//! { "notes": [ {id, title, content, createdAt, updatedAt}, ... ],
//!   "lastModified": "2024-01-15T10:30:00.000Z",
//!   "version": "1.0" }
//! ```
//!
//! Older data was stored as a bare JSON array of notes. That legacy form is accepted
//! when reading (see [`crate::engine`] and [`crate::commands::import`]) but never
//! written.
//!
//! ## Invariants
//!
//! - `id` is assigned at creation and never changes; it is unique within a repository.
//! - `createdAt` never changes.
//! - `updatedAt >= createdAt`, and `updatedAt` never moves backwards.
//! - `title` is 1–100 characters and `content` 1–10,000 characters, both non-empty
//!   after trimming. Lengths are counted in `char`s.
//!
//! Timestamps are written as ISO-8601 with millisecond precision and a `Z` suffix, which
//! is what browsers produce and what existing backups contain.

use crate::error::{Result, VnotesError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The repository never holds more notes than this.
pub const MAX_NOTES: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Version tag written into every envelope.
pub const ENVELOPE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: String, title: String, content: String, at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            content,
            created_at: at,
            updated_at: at,
        }
    }

    /// True once the note has been edited after creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// The persisted unit: the whole note set plus when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub notes: Vec<Note>,
    #[serde(with = "iso_millis")]
    pub last_modified: DateTime<Utc>,
    pub version: String,
}

impl Envelope {
    pub fn new(notes: Vec<Note>, last_modified: DateTime<Utc>) -> Self {
        Self {
            notes,
            last_modified,
            version: ENVELOPE_VERSION.to_string(),
        }
    }
}

/// The exported unit. Same shape as [`Envelope`] but stamped with the export date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope<'a> {
    pub notes: &'a [Note],
    #[serde(with = "iso_millis")]
    pub export_date: DateTime<Utc>,
    pub version: &'static str,
}

impl<'a> ExportEnvelope<'a> {
    pub fn new(notes: &'a [Note], export_date: DateTime<Utc>) -> Self {
        Self {
            notes,
            export_date,
            version: ENVELOPE_VERSION,
        }
    }
}

/// Candidate records pulled out of a stored or imported payload, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub records: Vec<Value>,
    /// `lastModified` of an envelope; `None` for the legacy bare array.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Decode either an enveloped `{"notes": [...]}` object or a legacy bare array.
///
/// Anything else (invalid JSON, an object without a `notes` array, a scalar) is an
/// [`VnotesError::ImportFormat`] error. Individual records are not inspected here.
pub fn decode_payload(raw: &str) -> Result<RawPayload> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| VnotesError::import_format(e.to_string()))?;
    match value {
        Value::Array(records) => Ok(RawPayload {
            records,
            last_modified: None,
        }),
        Value::Object(mut map) => {
            let records = match map.remove("notes") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(VnotesError::import_format(
                        "expected a \"notes\" array or a bare array of notes",
                    ))
                }
            };
            let last_modified = map
                .get("lastModified")
                .and_then(Value::as_str)
                .and_then(parse_timestamp);
            Ok(RawPayload {
                records,
                last_modified,
            })
        }
        _ => Err(VnotesError::import_format(
            "expected a \"notes\" array or a bare array of notes",
        )),
    }
}

/// Generate a note id from the creation time plus a random salt.
///
/// This is not collision-proof on its own; the repository checks the result against
/// the live set and asks again on a clash.
pub fn generate_id(at: DateTime<Utc>) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}{}", at.timestamp_millis(), &salt[..9])
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
