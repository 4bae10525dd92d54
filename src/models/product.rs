//! Product registry tools.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use crate::config::Endpoints;
use crate::error::Result;
use crate::request::UpstreamRequest;
use crate::traits::{require_non_empty, Adapter, ToolParams};

/// Parameters for `create_product`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateProductParams {
    /// The name of the product (e.g., "nginx").
    pub product_name: String,
    /// URL of the product's release notes or information.
    #[serde(default)]
    pub release_url: Option<String>,
    /// Vendor name. The API finds or creates the vendor.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Vendor website, used only when the vendor has to be created.
    #[serde(default)]
    pub vendor_website: Option<String>,
}

impl ToolParams for CreateProductParams {
    fn check(&self) -> Result<()> {
        require_non_empty("product_name", &self.product_name)
    }
}

impl Adapter for CreateProductParams {
    const NAME: &'static str = "create_product";
    const DESCRIPTION: &'static str = "Create a new product, optionally associating it with \
         a vendor that the API will find or create.";
    const MUTATES: bool = true;

    /// The body always carries a `vendor` object. Without a vendor its
    /// fields are empty strings, which the API reads as "no vendor".
    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest> {
        Ok(UpstreamRequest::post(
            endpoints.product.clone(),
            json!({
                "name": self.product_name,
                "release_url": self.release_url,
                "vendor": {
                    "name": self.vendor_name.as_deref().unwrap_or_default(),
                    "website": self.vendor_website.as_deref().unwrap_or_default(),
                },
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::Value;

    fn validate(value: Value) -> Result<CreateProductParams> {
        CreateProductParams::validate(value.as_object().cloned().unwrap())
    }

    #[test]
    fn body_without_vendor_has_empty_vendor_object() {
        let params = validate(json!({"product_name": "nginx"})).unwrap();
        let req = params.request(&Endpoints::default()).unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/checks/product");
        assert_eq!(
            req.body,
            Some(json!({
                "name": "nginx",
                "release_url": null,
                "vendor": {"name": "", "website": ""}
            }))
        );
    }

    #[test]
    fn body_with_vendor() {
        let params = validate(json!({
            "product_name": "nginx",
            "release_url": "https://nginx.org/en/CHANGES",
            "vendor_name": "F5",
            "vendor_website": "https://www.f5.com"
        }))
        .unwrap();
        let body = params.request(&Endpoints::default()).unwrap().body.unwrap();

        assert_eq!(body["release_url"], "https://nginx.org/en/CHANGES");
        assert_eq!(body["vendor"], json!({"name": "F5", "website": "https://www.f5.com"}));
    }

    #[test]
    fn vendor_name_without_website_sends_empty_website() {
        let params = validate(json!({"product_name": "nginx", "vendor_name": "F5"})).unwrap();
        let body = params.request(&Endpoints::default()).unwrap().body.unwrap();
        assert_eq!(body["vendor"]["website"], "");
    }

    #[test]
    fn product_name_is_required() {
        assert!(validate(json!({"vendor_name": "F5"})).is_err());
        assert!(validate(json!({"product_name": ""})).is_err());
    }
}
