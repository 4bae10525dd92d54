//! Tool registry shared by both hosts.
//!
//! Adapters are registered once by type; a registry can then advertise
//! their descriptors and dispatch calls by name, whatever transport the
//! host uses.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::OpsifyClient;
use crate::error::{OpsifyError, Result};
use crate::models::{
    AllLatestVersionsParams, AllVersionsParams, CreateProductParams, CreateVersionParams,
    DeleteVersionParams, LatestVersionParams, LoadVersionsParams, SearchCveParams,
    SearchReleasesParams, SpecificVersionParams, UpdateVersionParams, VersionCvesParams,
    VersionsParams,
};
use crate::traits::{Adapter, JsonObject, OutputStyle, ToolParams};

/// Descriptor of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Whether the tool modifies upstream data.
    pub mutates: bool,
    /// JSON Schema of the accepted arguments.
    pub input_schema: Arc<JsonObject>,
}

#[async_trait]
trait RegisteredTool: Send + Sync {
    fn info(&self) -> ToolInfo;

    async fn call(
        &self,
        client: &OpsifyClient,
        arguments: JsonObject,
        style: OutputStyle,
    ) -> Result<String>;
}

struct Entry<A>(PhantomData<fn() -> A>);

#[async_trait]
impl<A: Adapter + 'static> RegisteredTool for Entry<A> {
    fn info(&self) -> ToolInfo {
        ToolInfo {
            name: A::NAME,
            description: A::DESCRIPTION,
            mutates: A::MUTATES,
            input_schema: A::input_schema(),
        }
    }

    async fn call(
        &self,
        client: &OpsifyClient,
        arguments: JsonObject,
        style: OutputStyle,
    ) -> Result<String> {
        let params = A::validate(arguments)?;
        let value = params.run(client).await?;
        params.render(&value, style)
    }
}

/// Maps tool names to adapters.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn RegisteredTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. A later registration with the same name
    /// replaces the earlier one.
    #[must_use]
    pub fn with<A: Adapter + 'static>(mut self) -> Self {
        self.tools.retain(|tool| tool.info().name != A::NAME);
        self.tools.push(Box::new(Entry::<A>(PhantomData)));
        self
    }

    /// Every tool the Opsify API supports.
    pub fn full() -> Self {
        Self::new()
            .with::<SpecificVersionParams>()
            .with::<LatestVersionParams>()
            .with::<VersionsParams>()
            .with::<AllVersionsParams>()
            .with::<AllLatestVersionsParams>()
            .with::<SearchReleasesParams>()
            .with::<VersionCvesParams>()
            .with::<SearchCveParams>()
            .with::<CreateVersionParams>()
            .with::<UpdateVersionParams>()
            .with::<DeleteVersionParams>()
            .with::<LoadVersionsParams>()
            .with::<CreateProductParams>()
    }

    /// Tool set of the session host.
    pub fn session(read_only: bool) -> Self {
        let mut registry = Self::full();
        if read_only {
            registry.tools.retain(|tool| !tool.info().mutates);
        }
        registry
    }

    /// Tool set of the stdio host: CVE search only.
    pub fn cve_only() -> Self {
        Self::new().with::<SearchCveParams>()
    }

    /// Descriptors in registration order.
    pub fn infos(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|tool| tool.info()).collect()
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.info().name).collect()
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn find(&self, name: &str) -> Option<&dyn RegisteredTool> {
        self.tools
            .iter()
            .find(|tool| tool.info().name == name)
            .map(Box::as_ref)
    }

    /// Validate arguments, call the upstream API and render the result.
    ///
    /// # Errors
    ///
    /// Returns [`OpsifyError::UnknownTool`] for unregistered names, and
    /// otherwise whatever validation or the upstream call produced.
    #[tracing::instrument(skip(self, client, arguments))]
    pub async fn call(
        &self,
        client: &OpsifyClient,
        name: &str,
        arguments: JsonObject,
        style: OutputStyle,
    ) -> Result<String> {
        let tool = self
            .find(name)
            .ok_or_else(|| OpsifyError::UnknownTool(name.to_string()))?;

        let result = tool.call(client, arguments, style).await;
        if let Err(ref err) = result {
            tracing::warn!(tool = name, error = %err, "tool call failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_registry_has_every_tool_once() {
        let registry = ToolRegistry::full();
        let names = registry.names();
        assert_eq!(names.len(), 13);

        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn read_only_registry_drops_mutations() {
        let registry = ToolRegistry::session(true);
        for name in [
            "create_version",
            "update_version",
            "delete_version",
            "load_versions",
            "create_product",
        ] {
            assert!(!registry.contains(name), "{name} should not be registered");
        }
        assert!(registry.contains("get_specific_version"));
        assert!(registry.contains("search_cve"));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn cve_only_registry() {
        let registry = ToolRegistry::cve_only();
        assert_eq!(registry.names(), vec!["search_cve"]);
    }

    #[test]
    fn registering_twice_replaces() {
        let registry = ToolRegistry::new()
            .with::<SearchCveParams>()
            .with::<SearchCveParams>();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn advertised_schema_matches_validation_type() {
        let registry = ToolRegistry::full();
        for info in registry.infos() {
            assert_eq!(info.input_schema["type"], "object", "{}", info.name);
        }

        let info = registry
            .infos()
            .into_iter()
            .find(|info| info.name == "get_specific_version")
            .unwrap();
        assert_eq!(info.input_schema, SpecificVersionParams::input_schema());
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected_without_network() {
        let client = OpsifyClient::new("key", "http://127.0.0.1:9").unwrap();
        let err = ToolRegistry::cve_only()
            .call(&client, "create_version", JsonObject::new(), OutputStyle::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsifyError::UnknownTool(_)));
    }
}
