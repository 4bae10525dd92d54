//! Release (version) tools.
//!
//! Every tool here targets the release endpoint: lookups by product,
//! paginated listings, search, and the create/update/delete/load mutations.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::OpsifyClient;
use crate::config::Endpoints;
use crate::error::{OpsifyError, Result};
use crate::models::types::{DateField, DateParam, VersionString};
use crate::pagination::PageQuery;
use crate::request::{segment, UpstreamRequest};
use crate::traits::{Adapter, ToolParams};

/// Optional vendor filter attached to lookups by product.
#[derive(Debug, Serialize)]
struct VendorFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
}

fn product_path(endpoints: &Endpoints, product_name: &str) -> Result<String> {
    Ok(format!(
        "{}/{}",
        endpoints.release,
        segment("product_name", product_name)?
    ))
}

fn version_path(
    endpoints: &Endpoints,
    product_name: &str,
    version: &VersionString,
) -> Result<String> {
    Ok(format!(
        "{}/{}",
        product_path(endpoints, product_name)?,
        segment("version", version.as_str())?
    ))
}

fn check_identifiers(product_name: &str, version: Option<&VersionString>) -> Result<()> {
    segment("product_name", product_name)?;
    if let Some(version) = version {
        segment("version", version.as_str())?;
    }
    Ok(())
}

// ============================================================================
// Lookups by product
// ============================================================================

/// Parameters for `get_latest_version`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LatestVersionParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Optional vendor name to filter by.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl ToolParams for LatestVersionParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, None)
    }
}

impl Adapter for LatestVersionParams {
    const NAME: &'static str = "get_latest_version";
    const DESCRIPTION: &'static str = "Get the latest version information for a product, \
         optionally filtered by vendor.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(format!("{}/latest", product_path(endpoints, &self.product_name)?))
            .with_query(&VendorFilter {
                vendor: self.vendor.as_deref(),
            })
    }
}

/// Parameters for `get_versions`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VersionsParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Optional vendor name to filter by.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl ToolParams for VersionsParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, None)
    }
}

impl Adapter for VersionsParams {
    const NAME: &'static str = "get_versions";
    const DESCRIPTION: &'static str = "Get all known versions of a product, \
         optionally filtered by vendor.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(product_path(endpoints, &self.product_name)?).with_query(&VendorFilter {
            vendor: self.vendor.as_deref(),
        })
    }
}

/// Parameters for `get_specific_version`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpecificVersionParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Version to retrieve (e.g., "1.0.0"). Must be a string, never a number.
    pub version: VersionString,
    /// Optional vendor name to filter by.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl ToolParams for SpecificVersionParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, Some(&self.version))
    }
}

impl Adapter for SpecificVersionParams {
    const NAME: &'static str = "get_specific_version";
    const DESCRIPTION: &'static str = "Get a specific version of a product. \
         The version must be passed as a string, e.g. \"1.23\" not 1.23.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(version_path(endpoints, &self.product_name, &self.version)?)
            .with_query(&VendorFilter {
                vendor: self.vendor.as_deref(),
            })
    }
}

/// Parameters for `get_version_cves`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VersionCvesParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Version to list CVEs for (e.g., "1.0.0"). Must be a string.
    pub version: VersionString,
    /// Optional vendor name to filter by.
    #[serde(default)]
    pub vendor: Option<String>,
}

impl ToolParams for VersionCvesParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, Some(&self.version))
    }
}

impl Adapter for VersionCvesParams {
    const NAME: &'static str = "get_version_cves";
    const DESCRIPTION: &'static str = "Get the CVEs (Common Vulnerabilities and Exposures) \
         affecting a specific version of a product.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(format!(
            "{}/cves",
            version_path(endpoints, &self.product_name, &self.version)?
        ))
        .with_query(&VendorFilter {
            vendor: self.vendor.as_deref(),
        })
    }
}

// ============================================================================
// Listings and search
// ============================================================================

/// Parameters for `get_all_versions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AllVersionsParams {
    /// Filter by product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Filter by vendor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(flatten)]
    pub paging: PageQuery,
}

impl ToolParams for AllVersionsParams {}

impl Adapter for AllVersionsParams {
    const NAME: &'static str = "get_all_versions";
    const DESCRIPTION: &'static str = "List all versions of all products with optional \
         product/vendor filters and pagination.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(endpoints.release.clone()).with_query(self)
    }
}

/// Parameters for `get_all_latest_versions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AllLatestVersionsParams {
    /// Filter by product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Filter by vendor name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(flatten)]
    pub paging: PageQuery,
}

impl ToolParams for AllLatestVersionsParams {}

impl Adapter for AllLatestVersionsParams {
    const NAME: &'static str = "get_all_latest_versions";
    const DESCRIPTION: &'static str = "List the latest version of every product with \
         optional product/vendor filters and pagination.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(format!("{}/latest", endpoints.release)).with_query(self)
    }
}

/// Parameters for `search_releases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchReleasesParams {
    /// Vendor name to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Product name to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Start of the date range: YYYY-MM-DD or ISO 8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<DateParam>,
    /// End of the date range: YYYY-MM-DD or ISO 8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<DateParam>,
    /// Which date field the range applies to (default: release_date).
    #[serde(default)]
    pub date_field: DateField,
    #[serde(flatten)]
    pub paging: PageQuery,
}

impl ToolParams for SearchReleasesParams {}

impl Adapter for SearchReleasesParams {
    const NAME: &'static str = "search_releases";
    const DESCRIPTION: &'static str = "Search releases by vendor, product name and date \
         range. Dates accept YYYY-MM-DD or ISO 8601 timestamps.";

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        UpstreamRequest::get(format!("{}/search", endpoints.release)).with_query(self)
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Lifecycle dates of a release. These are the mutable fields of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReleaseDates {
    /// Release date: YYYY-MM-DD (e.g., "2024-04-15") or ISO 8601 timestamp.
    pub release_date: DateParam,
    /// End of active support: YYYY-MM-DD or ISO 8601 timestamp.
    pub active_support_end_date: DateParam,
    /// End of security support: YYYY-MM-DD or ISO 8601 timestamp.
    pub security_support_end_date: DateParam,
    /// End of life: YYYY-MM-DD or ISO 8601 timestamp.
    pub eol_date: DateParam,
}

/// Parameters for `create_version`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateVersionParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Version identifier (e.g., "1.0.0"). Always a string: "1.0" not 1.0.
    pub version: VersionString,
    #[serde(flatten)]
    pub dates: ReleaseDates,
}

impl ToolParams for CreateVersionParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, Some(&self.version))
    }
}

impl Adapter for CreateVersionParams {
    const NAME: &'static str = "create_version";
    const DESCRIPTION: &'static str = "Create a new version entry for a product release. \
         The version must be a string; dates accept YYYY-MM-DD or ISO 8601 timestamps.";
    const MUTATES: bool = true;

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        let body =
            serde_json::to_value(self).map_err(|e| OpsifyError::InvalidParams(e.to_string()))?;
        Ok(UpstreamRequest::post(endpoints.release.clone(), body))
    }
}

/// Parameters for `update_version`.
///
/// `product_name` and `version` locate the release and are never sent in
/// the body.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateVersionParams {
    /// Product to update (identifier, cannot be changed).
    pub product_name: String,
    /// Version to update (identifier, cannot be changed). Must be a string.
    pub version: VersionString,
    #[serde(flatten)]
    pub dates: ReleaseDates,
}

impl ToolParams for UpdateVersionParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, Some(&self.version))
    }
}

impl Adapter for UpdateVersionParams {
    const NAME: &'static str = "update_version";
    const DESCRIPTION: &'static str = "Update the lifecycle dates of an existing version. \
         product_name and version identify the entry and cannot be changed.";
    const MUTATES: bool = true;

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        let body = serde_json::to_value(&self.dates)
            .map_err(|e| OpsifyError::InvalidParams(e.to_string()))?;
        Ok(UpstreamRequest::put(
            version_path(endpoints, &self.product_name, &self.version)?,
            body,
        ))
    }
}

/// Parameters for `delete_version`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteVersionParams {
    /// Product name (e.g., "nginx").
    pub product_name: String,
    /// Version to delete (e.g., "1.0.0"). Must be a string.
    pub version: VersionString,
}

impl ToolParams for DeleteVersionParams {
    fn check(&self) -> Result<()> {
        check_identifiers(&self.product_name, Some(&self.version))
    }
}

#[async_trait]
impl Adapter for DeleteVersionParams {
    const NAME: &'static str = "delete_version";
    const DESCRIPTION: &'static str = "Delete a specific version of a product.";
    const MUTATES: bool = true;

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        Ok(UpstreamRequest::delete(version_path(
            endpoints,
            &self.product_name,
            &self.version,
        )?))
    }

    /// The upstream body is discarded; success is reported with a fixed
    /// envelope.
    async fn run(&self, client: &OpsifyClient) -> Result<Value> {
        let request = self.request(client.endpoints())?;
        client.execute(&request).await?;
        Ok(json!({
            "status": "success",
            "message": format!(
                "Version {} of product {} deleted successfully",
                self.version, self.product_name
            ),
        }))
    }
}

/// Parameters for `load_versions`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LoadVersionsParams {
    /// Release data as a JSON string: an array `[...]`, a single release
    /// object `{...}`, or `{"releases": [...]}`. Each release needs
    /// product_name, version (string), release_date,
    /// active_support_end_date, security_support_end_date and eol_date.
    pub releases: String,
}

impl LoadVersionsParams {
    /// Parse the payload without reshaping it.
    ///
    /// # Errors
    ///
    /// Returns [`OpsifyError::InvalidJson`] if the text is not JSON, or
    /// [`OpsifyError::InvalidParams`] if it is a bare scalar.
    pub fn parse_releases(&self) -> Result<Value> {
        let payload: Value =
            serde_json::from_str(&self.releases).map_err(OpsifyError::InvalidJson)?;
        match payload {
            Value::Array(_) | Value::Object(_) => Ok(payload),
            _ => Err(OpsifyError::InvalidParams(
                "releases must be a JSON array or object".to_string(),
            )),
        }
    }
}

impl ToolParams for LoadVersionsParams {}

impl Adapter for LoadVersionsParams {
    const NAME: &'static str = "load_versions";
    const DESCRIPTION: &'static str = "Bulk-load release entries from a JSON string. \
         Accepts a JSON array, a single release object, or {\"releases\": [...]}.";
    const MUTATES: bool = true;

    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        Ok(UpstreamRequest::post(
            format!("{}/load", endpoints.release),
            self.parse_releases()?,
        ))
    }
}
