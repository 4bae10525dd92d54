//! Tool adapter trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::OpsifyClient;
use crate::config::Endpoints;
use crate::error::Result;
use crate::output::to_pretty_json;
use crate::request::UpstreamRequest;
use crate::traits::ToolParams;

/// How a tool result is rendered for the calling host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Pretty-printed JSON, verbatim from upstream.
    #[default]
    Json,
    /// Human-readable summary where the tool has one.
    Summary,
}

/// One MCP tool backed by one upstream request.
///
/// Implementors map their validated parameters onto an
/// [`UpstreamRequest`]; the default [`Adapter::run`] executes it and returns
/// the upstream JSON unchanged.
///
/// # Example
///
/// ```ignore
/// let params = SpecificVersionParams::validate(arguments)?;
/// let value = params.run(&client).await?;
/// let text = params.render(value, OutputStyle::Json)?;
/// ```
#[async_trait]
pub trait Adapter: ToolParams + Send + Sync {
    /// Tool name as advertised to MCP clients.
    const NAME: &'static str;

    /// Tool description as advertised to MCP clients.
    const DESCRIPTION: &'static str;

    /// Whether the tool modifies upstream data.
    const MUTATES: bool = false;

    /// Build the upstream request.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload argument cannot be parsed.
    fn request(&self, endpoints: &Endpoints) -> Result<UpstreamRequest>;

    /// Execute the tool against the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the call fails.
    async fn run(&self, client: &OpsifyClient) -> Result<Value> {
        let request = self.request(client.endpoints())?;
        client.execute(&request).await
    }

    /// Render the result as tool output text.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be rendered.
    fn render(&self, value: &Value, _style: OutputStyle) -> Result<String> {
        to_pretty_json(value)
    }
}
