//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use super::state::{CveRecord, ProductRecord, ReleaseRecord, VendorRecord};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Release Fixtures
    // =========================================================================

    /// Create a release with every lifecycle date set.
    pub fn release(
        product: &str,
        version: &str,
        vendor: &str,
        release_date: &str,
        eol_date: &str,
    ) -> ReleaseRecord {
        ReleaseRecord {
            product_name: product.to_string(),
            version: version.to_string(),
            vendor: Some(vendor.to_string()),
            release_date: Some(release_date.to_string()),
            active_support_end_date: Some(eol_date.to_string()),
            security_support_end_date: Some(eol_date.to_string()),
            eol_date: Some(eol_date.to_string()),
        }
    }

    // =========================================================================
    // Product Fixtures
    // =========================================================================

    /// Create a product with a vendor.
    pub fn product(id: u64, name: &str, vendor: &str, website: &str) -> ProductRecord {
        ProductRecord {
            id,
            name: name.to_string(),
            release_url: None,
            vendor: Some(VendorRecord {
                name: vendor.to_string(),
                website: website.to_string(),
            }),
        }
    }

    // =========================================================================
    // CVE Fixtures
    // =========================================================================

    /// Create a published CVE affecting one product version.
    pub fn cve(
        cve_id: &str,
        title: &str,
        score: f64,
        product: &str,
        version: &str,
        published: &str,
    ) -> CveRecord {
        let severity = match score {
            s if s >= 9.0 => "CRITICAL",
            s if s >= 7.0 => "HIGH",
            s if s >= 4.0 => "MEDIUM",
            _ => "LOW",
        };
        CveRecord {
            cve_id: cve_id.to_string(),
            title: title.to_string(),
            score: Some(score),
            state: "PUBLISHED".to_string(),
            severity: Some(severity.to_string()),
            published_date: Some(published.to_string()),
            vendor: None,
            description: Some(format!("{title} in {product} {version}.")),
            references: vec![format!("https://nvd.nist.gov/vuln/detail/{cve_id}")],
            product_name: Some(product.to_string()),
            product_version: Some(version.to_string()),
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Two products with a few releases and CVEs.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario {
            releases: vec![
                Self::release("nginx", "1.24.0", "F5", "2023-04-11", "2024-04-23"),
                Self::release("nginx", "1.25.0", "F5", "2023-05-23", "2024-04-23"),
                Self::release("nginx", "1.26.0", "F5", "2024-04-23", "2025-04-23"),
                Self::release("istio", "1.10", "Istio", "2021-05-18", "2022-01-07"),
                Self::release("istio", "1.22", "Istio", "2024-05-13", "2025-02-28"),
            ],
            products: vec![
                Self::product(1, "nginx", "F5", "https://www.f5.com"),
                Self::product(2, "istio", "Istio", "https://istio.io"),
            ],
            cves: vec![
                Self::cve(
                    "CVE-2024-7347",
                    "mp4 module buffer over-read",
                    4.7,
                    "nginx",
                    "1.25.0",
                    "2024-08-14",
                ),
                Self::cve(
                    "CVE-2024-24989",
                    "HTTP/3 QUIC null pointer dereference",
                    7.5,
                    "nginx",
                    "1.25.0",
                    "2024-02-14",
                ),
                Self::cve(
                    "CVE-2021-39155",
                    "Authorization policy bypass",
                    8.3,
                    "istio",
                    "1.10",
                    "2021-08-24",
                ),
            ],
        }
    }
}

/// A complete test scenario.
pub struct DefaultScenario {
    pub releases: Vec<ReleaseRecord>,
    pub products: Vec<ProductRecord>,
    pub cves: Vec<CveRecord>,
}
