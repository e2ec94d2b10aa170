//! Common types used throughout the crate
//!
//! This module contains shared type aliases, the controller's response
//! envelope, and URL/path helpers.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Controller paths
// ============================================================================

/// Prefix of the Network Application REST API behind the UniFi OS proxy
pub const NETWORK_API_PREFIX: &str = "/proxy/network/api";

/// Path of a site-scoped resource, e.g. `site_path("default", "stat/device")`
pub fn site_path(site: &str, resource: &str) -> String {
    format!(
        "{NETWORK_API_PREFIX}/s/{site}/{}",
        resource.trim_start_matches('/')
    )
}

/// Join a base URL and an absolute path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

// ============================================================================
// Response envelope
// ============================================================================

/// Controller response body: `{ "meta": {...}, "data": [...] }`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Result rows; absent or null means empty
    pub data: Option<Vec<T>>,
}

impl<T> ApiEnvelope<T> {
    /// The rows, empty when the controller sent none
    pub fn into_records(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Decode the `data` rows of a controller response.
///
/// A body without `data` (or a non-object body such as an empty response)
/// yields an empty collection.
pub fn records<T: DeserializeOwned>(body: &JsonValue) -> Result<Vec<T>> {
    if !body.is_object() {
        return Ok(Vec::new());
    }
    let envelope: ApiEnvelope<T> = serde_json::from_value(body.clone()).map_err(Error::from)?;
    Ok(envelope.into_records())
}

/// Raw `data` rows of a controller response
pub fn raw_records(body: &JsonValue) -> Vec<JsonValue> {
    body.get("data")
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default()
}
