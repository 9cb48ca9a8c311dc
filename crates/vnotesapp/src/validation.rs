//! Note validation.
//!
//! Two entry points share the same bounds:
//!
//! - [`validate_input`] checks user input for create/update and produces the message the
//!   user sees.
//! - [`validate_record`] checks an untyped candidate record coming from storage or a
//!   backup file. Invalid candidates are dropped by the caller, never repaired.

use crate::error::{Result, VnotesError};
use crate::model::{parse_timestamp, Note, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH};
use serde_json::{Map, Value};
use tracing::debug;

/// Validates an already-trimmed title and content.
///
/// # Examples
/// ```
/// use vnotesapp::validation::validate_input;
///
/// assert!(validate_input("Shopping", "Buy milk").is_ok());
/// assert!(validate_input("", "Buy milk").is_err());
/// assert!(validate_input("Shopping", "   ").is_err());
/// assert!(validate_input(&"x".repeat(101), "Buy milk").is_err());
/// ```
pub fn validate_input(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(VnotesError::validation("Title is required"));
    }
    if content.trim().is_empty() {
        return Err(VnotesError::validation("Content is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(VnotesError::validation(format!(
            "Title must be {} characters or less",
            MAX_TITLE_LENGTH
        )));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(VnotesError::validation(format!(
            "Content must be {} characters or less",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(())
}

/// Why a candidate record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    NotAnObject,
    /// Field missing or not a string.
    BadField(&'static str),
    OutOfBounds(&'static str),
    BadTimestamp(&'static str),
    /// `updatedAt` is earlier than `createdAt`.
    TimeTravel,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::NotAnObject => write!(f, "record is not an object"),
            RecordError::BadField(name) => write!(f, "field '{}' missing or not a string", name),
            RecordError::OutOfBounds(name) => write!(f, "field '{}' out of bounds", name),
            RecordError::BadTimestamp(name) => write!(f, "field '{}' is not a timestamp", name),
            RecordError::TimeTravel => write!(f, "updatedAt precedes createdAt"),
        }
    }
}

/// Checks a candidate record and converts it into a [`Note`].
///
/// All five fields must be present as strings, title and content must be within
/// bounds, both timestamps must parse, and `updatedAt` must not precede `createdAt`.
pub fn validate_record(candidate: &Value) -> std::result::Result<Note, RecordError> {
    let obj = candidate.as_object().ok_or(RecordError::NotAnObject)?;
    let id = str_field(obj, "id")?;
    let title = str_field(obj, "title")?;
    let content = str_field(obj, "content")?;
    let created_raw = str_field(obj, "createdAt")?;
    let updated_raw = str_field(obj, "updatedAt")?;

    if id.trim().is_empty() {
        return Err(RecordError::OutOfBounds("id"));
    }
    if !within_bounds(title, MAX_TITLE_LENGTH) {
        return Err(RecordError::OutOfBounds("title"));
    }
    if !within_bounds(content, MAX_CONTENT_LENGTH) {
        return Err(RecordError::OutOfBounds("content"));
    }

    let created_at = parse_timestamp(created_raw).ok_or(RecordError::BadTimestamp("createdAt"))?;
    let updated_at = parse_timestamp(updated_raw).ok_or(RecordError::BadTimestamp("updatedAt"))?;
    if updated_at < created_at {
        return Err(RecordError::TimeTravel);
    }

    Ok(Note {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at,
        updated_at,
    })
}

/// Validate every candidate, keeping the good ones in order.
/// Returns the valid notes and how many candidates were dropped.
pub fn partition_records(records: &[Value]) -> (Vec<Note>, usize) {
    let mut valid = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for (position, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(note) => valid.push(note),
            Err(reason) => {
                debug!("dropping record #{}: {}", position, reason);
                dropped += 1;
            }
        }
    }
    (valid, dropped)
}

pub fn is_valid_record(candidate: &Value) -> bool {
    validate_record(candidate).is_ok()
}

fn str_field<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
) -> std::result::Result<&'a str, RecordError> {
    obj.get(name)
        .and_then(Value::as_str)
        .ok_or(RecordError::BadField(name))
}

fn within_bounds(text: &str, max: usize) -> bool {
    !text.trim().is_empty() && text.chars().count() <= max
}
