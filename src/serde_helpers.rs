//! Serde helpers for forward-compatible event deserialization.
//!
//! When the `tracing` feature is enabled, this module also logs any unknown fields encountered
//! during deserialization, which makes upstream schema growth visible without failing decodes.

use serde::de::DeserializeOwned;
use serde::{Deserialize as _, Deserializer};
#[cfg(feature = "tracing")]
use serde_json::Value;

/// Deserialize an optional field, treating a malformed value the same as an absent one.
///
/// Use with `#[serde(default, deserialize_with = "lenient")]` on `Option<T>` fields whose shape
/// is not load-bearing. The raw value is captured first, so the enclosing object still parses
/// even when this field has an unexpected type.
pub fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                type_name = %std::any::type_name::<T>(),
                error = %e,
                "ignoring malformed optional field"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
            Ok(None)
        }
    }
}

/// Deserialize a JSON payload, logging fields the target type does not capture.
///
/// Unknown fields are reported at `debug` level but never cause deserialization to fail. On
/// failure, the JSON path of the offending value is logged before the error is returned.
///
/// ```ignore
/// let payload = br#"{"type": "StasisStart", "replace_channel": {}}"#;
/// let envelope: Envelope = from_slice_with_warnings(payload)?;
/// // Logs: DEBUG unknown field "replace_channel" with value {} in Envelope
/// ```
#[cfg(feature = "tracing")]
pub fn from_slice_with_warnings<T: DeserializeOwned>(
    bytes: &[u8],
) -> std::result::Result<T, serde_json::Error> {
    use std::any::type_name;

    let original: Value = serde_json::from_slice(bytes)?;

    tracing::trace!(
        type_name = %type_name::<T>(),
        json = %original,
        "deserializing JSON"
    );

    // Collect unknown field paths during deserialization
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(&original, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        // Re-run with serde_path_to_error to get the error path
        let path_result: std::result::Result<T, _> = serde_path_to_error::deserialize(&original);
        if let Err(path_err) = path_result {
            let path = path_err.path().to_string();
            let value_display = format_value(lookup_value(&original, &path));

            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %value_display,
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    if !unknown_paths.is_empty() {
        let type_name = type_name::<T>();
        for path in unknown_paths {
            let value_display = format_value(lookup_value(&original, &path));

            tracing::debug!(
                type_name = %type_name,
                field = %path,
                value = %value_display,
                "unknown field in event payload"
            );
        }
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn from_slice_with_warnings<T: DeserializeOwned>(
    bytes: &[u8],
) -> std::result::Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Look up a value in a JSON structure by path.
///
/// Handles paths from both `serde_ignored` and `serde_path_to_error`:
/// - `?` for Option wrappers (skipped, as JSON has no Option representation)
/// - Numeric indices for arrays: `args.0` or `args[0]`
/// - Field names for objects: `channel.caller` or `channel.caller.number`
///
/// Returns `None` if the path doesn't exist or traverses a non-container value.
#[cfg(feature = "tracing")]
fn lookup_value<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    let mut current = value;

    for segment in parse_path_segments(path) {
        if segment == "?" {
            continue;
        }

        match current {
            Value::Object(map) => {
                current = map.get(&segment)?;
            }
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Split a path on `.` and `[...]`, e.g. `"args[1].name"` -> `["args", "1", "name"]`.
#[cfg(feature = "tracing")]
fn parse_path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    let mut chars = path.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    current.push(inner);
                }
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            ']' => {}
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(feature = "tracing")]
fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "<unable to retrieve>".to_owned(),
    }
}
