//! Tolerant decoders for fields of the persisted blob.
//!
//! A field holding a value this build cannot read falls back to its default,
//! and an unreadable list element is dropped on its own. Only a blob that is
//! not a JSON object at all is rejected as a whole.

use crate::models::app_state::Theme;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A theme id, or the default theme for ids this build does not know.
pub(crate) fn theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value.as_str().map(str::parse::<Theme>) {
        Some(Ok(theme)) => Ok(theme),
        _ => {
            tracing::warn!("Unknown stored theme {}, using {}", value, Theme::default());
            Ok(Theme::default())
        }
    }
}

pub(crate) fn flag_on<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    flag(deserializer, true)
}

pub(crate) fn flag_off<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    flag(deserializer, false)
}

fn flag<'de, D>(deserializer: D, default: bool) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or_else(|| {
        tracing::warn!("Stored setting {} is not a boolean, using {}", value, default);
        default
    }))
}

/// A screen id; anything but a string becomes empty, which the router renders as home.
pub(crate) fn screen_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        other => {
            tracing::warn!("Stored screen id {} is not a string", other);
            Ok(String::new())
        }
    }
}

/// An optional record; `null` and unreadable values both become `None`.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!("Dropping unreadable stored record: {}", e);
            Ok(None)
        }
    }
}

/// A list of records, skipping elements that do not decode.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!("Stored list is a {}, ignoring it", json_kind(&other));
            return Ok(Vec::new());
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable stored record #{}: {}", index, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Restored {} of {} stored records", records.len(), total);
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
