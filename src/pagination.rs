//! Pagination parameters shared by listing and search tools.
//!
//! The release endpoints page with `page`/`page_size`; the CVE search
//! windows with `skip`/`limit`. Both are flattened into the tool parameter
//! structs and serialized straight into the query string.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Default number of items per page or window.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Page-number pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageQuery {
    /// Page number, starting from 1 (default: 1).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Offset/limit pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowQuery {
    /// Number of records to skip (default: 0).
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of records to return (default: 100).
    #[serde(default = "default_page_size")]
    pub limit: u32,
}

impl Default for WindowQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}
