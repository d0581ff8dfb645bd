//! Utility functions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version information for the importer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Parse a boolean-ish config value.
///
/// `1`, `true` and `yes` are true, anything else is false. A missing or
/// blank value yields `default`.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        None | Some("") => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
    }
}

/// Treat a missing or whitespace-only value as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip null leaves and empty containers from a JSON value.
///
/// Objects and arrays that end up empty are removed from their parent.
/// Returns `None` when nothing survives.
pub fn remove_empty_keys(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| remove_empty_keys(v).map(|v| (k, v)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        // arrays are kept verbatim unless empty
        Value::Array(items) if items.is_empty() => None,
        other => Some(other),
    }
}
