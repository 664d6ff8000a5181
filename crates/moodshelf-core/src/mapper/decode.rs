//! Decode-with-fallback helpers shared by every stored column.
//!
//! None of these fail: malformed stored values decode to the documented
//! default (empty list, `None`, or the enum's fallback member).

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Decodes a JSON-array column. Null, blank, invalid JSON and non-array
/// values all yield an empty list; array elements of the wrong shape are
/// skipped.
pub fn decode_json_list<T: DeserializeOwned>(raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Encodes a list as a JSON array, preserving order.
pub fn encode_json_list<T: Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Parses a stored enumeration value, falling back when absent or unknown.
pub fn decode_enum<T: FromStr>(raw: Option<&str>, fallback: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(fallback)
}

/// Like [`decode_enum`] but for nullable enumerations.
pub fn decode_optional_enum<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Parses RFC 3339 timestamps, plus SQLite's `CURRENT_TIMESTAMP` format.
pub fn decode_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn encode_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|t| t.to_rfc3339())
}

/// Non-negative integer column as a count; negatives and overflow are dropped.
pub fn decode_count(raw: Option<i64>) -> Option<u32> {
    raw.and_then(|n| u32::try_from(n).ok())
}

pub fn decode_word_count(raw: Option<i64>) -> Option<u64> {
    raw.and_then(|n| u64::try_from(n).ok())
}

/// 0/1/null column as a tri-state flag. Any non-zero value counts as set.
pub fn decode_flag(raw: Option<i64>) -> Option<bool> {
    raw.map(|n| n != 0)
}

pub fn encode_flag(value: Option<bool>) -> Option<i64> {
    value.map(i64::from)
}
