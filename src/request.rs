//! Upstream request description.
//!
//! Tool adapters build an [`UpstreamRequest`] from validated parameters; the
//! client executes it. Keeping the two apart lets the request shape be
//! checked without a network.

use std::borrow::Cow;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{OpsifyError, Result};

/// A single request to the Opsify API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/checks/release/nginx`.
    pub path: String,
    /// Query parameters. Unset values never appear here.
    pub query: Vec<(String, String)>,
    /// JSON body for POST/PUT.
    pub body: Option<Value>,
}

impl UpstreamRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// A PUT request with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    /// A DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Merge the fields of `query` into the query string.
    ///
    /// # Errors
    ///
    /// Returns an error if `query` does not serialize to a JSON object.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        self.query.extend(query_pairs(query)?);
        Ok(self)
    }

    /// Look up a query parameter by name.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Flatten a serializable struct into query pairs.
///
/// Null and empty-string values are dropped so unset filters are omitted
/// rather than sent empty.
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(query)
        .map_err(|e| OpsifyError::InvalidParams(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(OpsifyError::InvalidParams(
            "query parameters must serialize to an object".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// Percent-encode a single path segment.
///
/// Blank values and the dot segments `.` and `..` are rejected: URL
/// resolution would collapse them and address a different resource.
pub fn segment<'a>(field: &str, raw: &'a str) -> Result<Cow<'a, str>> {
    match raw {
        _ if raw.trim().is_empty() => Err(OpsifyError::InvalidParams(format!(
            "{field} must not be empty"
        ))),
        "." | ".." => Err(OpsifyError::InvalidParams(format!(
            "{field} must not be '.' or '..'"
        ))),
        _ => Ok(urlencoding::encode(raw)),
    }
}
