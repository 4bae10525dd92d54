//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Opsify API server.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A release record as stored and returned by the mock API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub product_name: String,
    pub version: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub active_support_end_date: Option<String>,
    #[serde(default)]
    pub security_support_end_date: Option<String>,
    #[serde(default)]
    pub eol_date: Option<String>,
}

impl ReleaseRecord {
    /// Value of one of the date columns by its query name.
    pub fn date(&self, field: &str) -> Option<&str> {
        match field {
            "release_date" => self.release_date.as_deref(),
            "active_support_end_date" => self.active_support_end_date.as_deref(),
            "security_support_end_date" => self.security_support_end_date.as_deref(),
            "eol_date" => self.eol_date.as_deref(),
            _ => None,
        }
    }
}

/// Vendor attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub name: String,
    #[serde(default)]
    pub website: String,
}

/// A product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub release_url: Option<String>,
    #[serde(default)]
    pub vendor: Option<VendorRecord>,
}

/// A CVE record with the affected product it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveRecord {
    pub cve_id: String,
    pub title: String,
    #[serde(default)]
    pub score: Option<f64>,
    pub state: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_version: Option<String>,
}

/// Release listing and search query. Flat, because query strings cannot
/// carry typed values through `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseFilter {
    pub product_name: Option<String>,
    pub vendor: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub date_field: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// CVE search query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CveFilter {
    pub cve_id: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub severity: Option<String>,
    pub score: Option<f64>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub vendor: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn opt_contains_ci(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack.is_some_and(|h| contains_ci(h, needle)),
    }
}

/// Compare on the date part only so timestamps and plain dates mix.
fn within(date: Option<&str>, from: Option<&str>, to: Option<&str>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = date else {
        return false;
    };
    let day = |s: &str| s.get(..10).unwrap_or(s).to_string();
    let date = day(date);
    from.map_or(true, |from| date >= day(from)) && to.map_or(true, |to| date <= day(to))
}

/// Shared state for the mock server.
///
/// Wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Releases in insertion order.
    pub releases: Vec<ReleaseRecord>,

    /// Products indexed by name.
    pub products: BTreeMap<String, ProductRecord>,

    /// CVE records.
    pub cves: Vec<CveRecord>,

    /// If set, requests must carry this value in the `apikey` header.
    pub required_key: Option<String>,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a release to the state.
    pub fn with_release(mut self, release: ReleaseRecord) -> Self {
        self.releases.push(release);
        self
    }

    /// Add a product to the state.
    pub fn with_product(mut self, product: ProductRecord) -> Self {
        self.products.insert(product.name.clone(), product);
        self
    }

    /// Add a CVE to the state.
    pub fn with_cve(mut self, cve: CveRecord) -> Self {
        self.cves.push(cve);
        self
    }

    /// Set the required API key.
    pub fn with_required_key(mut self, key: &str) -> Self {
        self.required_key = Some(key.to_string());
        self
    }

    /// Whether a request carrying `key` is allowed.
    pub fn authorized(&self, key: Option<&str>) -> bool {
        match &self.required_key {
            None => true,
            Some(required) => key == Some(required.as_str()),
        }
    }

    /// All versions of a product, optionally restricted to a vendor.
    pub fn versions(&self, product: &str, vendor: Option<&str>) -> Vec<&ReleaseRecord> {
        self.releases
            .iter()
            .filter(|r| r.product_name == product)
            .filter(|r| vendor.map_or(true, |v| r.vendor.as_deref() == Some(v)))
            .collect()
    }

    /// The most recently released version of a product.
    pub fn latest(&self, product: &str, vendor: Option<&str>) -> Option<&ReleaseRecord> {
        self.versions(product, vendor)
            .into_iter()
            .max_by(|a, b| a.release_date.cmp(&b.release_date))
    }

    /// A specific version.
    pub fn release(&self, product: &str, version: &str) -> Option<&ReleaseRecord> {
        self.releases
            .iter()
            .find(|r| r.product_name == product && r.version == version)
    }

    /// Releases matching a filter.
    pub fn search_releases(&self, filter: &ReleaseFilter) -> Vec<&ReleaseRecord> {
        let field = filter.date_field.as_deref().unwrap_or("release_date");
        self.releases
            .iter()
            .filter(|r| {
                opt_contains_ci(Some(&r.product_name), filter.product_name.as_deref())
                    && opt_contains_ci(r.vendor.as_deref(), filter.vendor.as_deref())
                    && within(
                        r.date(field),
                        filter.from_date.as_deref(),
                        filter.to_date.as_deref(),
                    )
            })
            .collect()
    }

    /// Latest release of every product matching a filter.
    pub fn latest_per_product(&self, filter: &ReleaseFilter) -> Vec<&ReleaseRecord> {
        let mut latest: BTreeMap<&str, &ReleaseRecord> = BTreeMap::new();
        for release in self.search_releases(filter) {
            let entry = latest.entry(release.product_name.as_str()).or_insert(release);
            if release.release_date > entry.release_date {
                *entry = release;
            }
        }
        latest.into_values().collect()
    }

    /// Insert a release. Returns false if the version already exists.
    pub fn insert_release(&mut self, release: ReleaseRecord) -> bool {
        if self.release(&release.product_name, &release.version).is_some() {
            return false;
        }
        self.releases.push(release);
        true
    }

    /// Replace the dates of an existing release.
    pub fn update_release(
        &mut self,
        product: &str,
        version: &str,
        dates: ReleaseRecord,
    ) -> Option<&ReleaseRecord> {
        let release = self
            .releases
            .iter_mut()
            .find(|r| r.product_name == product && r.version == version)?;
        release.release_date = dates.release_date;
        release.active_support_end_date = dates.active_support_end_date;
        release.security_support_end_date = dates.security_support_end_date;
        release.eol_date = dates.eol_date;
        Some(release)
    }

    /// Delete a release. Returns false if it did not exist.
    pub fn delete_release(&mut self, product: &str, version: &str) -> bool {
        let before = self.releases.len();
        self.releases
            .retain(|r| !(r.product_name == product && r.version == version));
        self.releases.len() != before
    }

    /// Create a product. Returns None if the name is taken.
    pub fn create_product(
        &mut self,
        name: &str,
        release_url: Option<String>,
        vendor: Option<VendorRecord>,
    ) -> Option<&ProductRecord> {
        if self.products.contains_key(name) {
            return None;
        }
        let id = self.products.len() as u64 + 1;
        let product = ProductRecord {
            id,
            name: name.to_string(),
            release_url,
            vendor,
        };
        self.products.insert(name.to_string(), product);
        self.products.get(name)
    }

    /// CVEs matching a filter.
    pub fn search_cves(&self, filter: &CveFilter) -> Vec<&CveRecord> {
        self.cves
            .iter()
            .filter(|c| {
                filter
                    .cve_id
                    .as_deref()
                    .map_or(true, |id| c.cve_id.eq_ignore_ascii_case(id))
                    && opt_contains_ci(Some(&c.title), filter.title.as_deref())
                    && filter
                        .state
                        .as_deref()
                        .map_or(true, |s| c.state.eq_ignore_ascii_case(s))
                    && filter.severity.as_deref().map_or(true, |s| {
                        c.severity
                            .as_deref()
                            .is_some_and(|cs| cs.eq_ignore_ascii_case(s))
                    })
                    && filter
                        .score
                        .map_or(true, |s| c.score.is_some_and(|cs| cs >= s))
                    && opt_contains_ci(c.product_name.as_deref(), filter.product_name.as_deref())
                    && filter
                        .product_version
                        .as_deref()
                        .map_or(true, |v| c.product_version.as_deref() == Some(v))
                    && opt_contains_ci(c.vendor.as_deref(), filter.vendor.as_deref())
                    && within(
                        c.published_date.as_deref(),
                        filter.from_date.as_deref(),
                        filter.to_date.as_deref(),
                    )
            })
            .collect()
    }
}
