//! Parameter model shared by validation and schema advertisement.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{OpsifyError, Result};

/// JSON object as carried by MCP tool calls and tool schemas.
pub type JsonObject = Map<String, Value>;

/// Typed, schema-described tool arguments.
///
/// The same type drives both [`ToolParams::validate`] and
/// [`ToolParams::input_schema`], so what a host advertises is exactly what
/// it accepts.
pub trait ToolParams: DeserializeOwned + JsonSchema + Sized {
    /// Checks that go beyond what the type system expresses, such as
    /// non-empty path identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`OpsifyError::InvalidParams`] describing the first violation.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// Validate raw tool arguments into typed parameters.
    ///
    /// Missing required fields, wrong primitive types and numeric version
    /// identifiers are all rejected here, before any request is built.
    ///
    /// # Errors
    ///
    /// Returns [`OpsifyError::InvalidParams`] on any validation failure.
    fn validate(arguments: JsonObject) -> Result<Self> {
        let params: Self = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| OpsifyError::InvalidParams(e.to_string()))?;
        params.check()?;
        Ok(params)
    }

    /// JSON Schema advertised as the tool's input schema.
    fn input_schema() -> Arc<JsonObject> {
        let schema = schemars::schema_for!(Self);
        match serde_json::to_value(&schema) {
            Ok(Value::Object(map)) => Arc::new(map),
            _ => Arc::new(Map::new()),
        }
    }
}

/// Reject blank identifiers that would produce a malformed path.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OpsifyError::InvalidParams(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
