//! CVE database tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Endpoints;
use crate::error::Result;
use crate::models::types::{DateParam, VersionString};
use crate::output::{render_cve_summary, to_pretty_json};
use crate::pagination::WindowQuery;
use crate::request::UpstreamRequest;
use crate::traits::{Adapter, OutputStyle, ToolParams};

/// A CVE record as returned by the search endpoint.
///
/// Only the fields shown in summaries are modelled; every field is
/// optional and kept as raw JSON so unexpected shapes still render.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cve {
    /// CVE identifier, e.g. "CVE-2024-1234".
    #[serde(default)]
    pub cve_id: Option<Value>,
    /// Short title.
    #[serde(default)]
    pub title: Option<Value>,
    /// CVSS score.
    #[serde(default)]
    pub score: Option<Value>,
    /// Record state, e.g. "PUBLISHED".
    #[serde(default)]
    pub state: Option<Value>,
    /// Publication date.
    #[serde(default)]
    pub published_date: Option<Value>,
    /// Affected vendor.
    #[serde(default)]
    pub vendor: Option<Value>,
    /// Full description.
    #[serde(default)]
    pub description: Option<Value>,
    /// Reference URLs.
    #[serde(default)]
    pub references: Option<Value>,
}

/// Parameters for `search_cve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchCveParams {
    /// CVE ID to search for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,
    /// Title to search in CVE description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// State to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Priority level to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Severity level to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// CVSS score to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Product name to filter affected products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Product version to filter affected products. Must be a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_version: Option<VersionString>,
    /// Vendor name to filter affected products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Start date for filtering (YYYY-MM-DD or ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<DateParam>,
    /// End date for filtering (YYYY-MM-DD or ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<DateParam>,
    #[serde(flatten)]
    pub window: WindowQuery,
}

impl ToolParams for SearchCveParams {}

impl Adapter for SearchCveParams {
    const NAME: &'static str = "search_cve";
    const DESCRIPTION: &'static str = "Search for CVEs by ID, title, state, priority, \
         severity, score, affected product/version/vendor and publication date range.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(format!("{}/search", endpoints.cve)).with_query(self)
    }

    fn render(&self, value: &Value, style: OutputStyle) -> Result<String> {
        match style {
            OutputStyle::Json => to_pretty_json(value),
            OutputStyle::Summary => render_cve_summary(value),
        }
    }
}
