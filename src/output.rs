//! Output formatting for tool results.
//!
//! Provides the [`PrettyPrint`] trait for human-readable summaries, used by
//! the stdio host, as an alternative to JSON.

use serde_json::Value;

use crate::error::{OpsifyError, Result};
use crate::models::Cve;

/// Text returned when a CVE search has no results.
pub const NO_CVES_MESSAGE: &str = "No CVEs found for the given criteria.";

/// Placeholder for fields missing from an upstream record.
const MISSING: &str = "N/A";

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for display.
    fn pretty_print(&self) -> String;
}

fn field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn joined(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| field(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        other => field(other),
    }
}

impl PrettyPrint for Cve {
    fn pretty_print(&self) -> String {
        [
            format!("CVE ID: {}", field(self.cve_id.as_ref())),
            format!("Title: {}", field(self.title.as_ref())),
            format!("Score: {}", field(self.score.as_ref())),
            format!("State: {}", field(self.state.as_ref())),
            format!("Published: {}", field(self.published_date.as_ref())),
            format!("Vendor: {}", field(self.vendor.as_ref())),
            format!("Description: {}", field(self.description.as_ref())),
            format!("References: {}", joined(self.references.as_ref())),
        ]
        .join("\n")
    }
}

/// Pretty-print a JSON value with two-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(OpsifyError::Decode)
}

/// Count the CVE records in a search result.
pub fn cve_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

/// Render a CVE search result as one block per CVE.
///
/// An empty (or null) result renders as [`NO_CVES_MESSAGE`]. A result that
/// is not a list is shown as JSON.
///
/// # Errors
///
/// Returns [`OpsifyError::Decode`] if a list item is not an object.
pub fn render_cve_summary(value: &Value) -> Result<String> {
    let items = match value {
        Value::Null => return Ok(NO_CVES_MESSAGE.to_string()),
        Value::Array(items) if items.is_empty() => return Ok(NO_CVES_MESSAGE.to_string()),
        Value::Array(items) => items,
        other => return to_pretty_json(other),
    };

    let blocks = items
        .iter()
        .map(|item| {
            serde_json::from_value::<Cve>(item.clone())
                .map(|cve| cve.pretty_print())
                .map_err(OpsifyError::Decode)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "Found {} CVEs:\n{}",
        blocks.len(),
        blocks.join("\n\n")
    ))
}
