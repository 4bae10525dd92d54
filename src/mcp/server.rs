//! MCP server handler for the Opsify API.

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData as McpError,
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        ListToolsResult, PaginatedRequestParam, Prompt, PromptArgument, PromptMessage,
        PromptMessageRole, PromptsCapability, ServerCapabilities, ServerInfo, Tool,
        ToolsCapability,
    },
    service::RequestContext,
    RoleServer,
};
use serde_json::{Number, Value};
use std::sync::Arc;

use crate::{
    mcp::registry::ToolRegistry, output::render_cve_summary, Adapter, Config, JsonObject,
    OpsifyClient, OpsifyError, OutputStyle, SearchCveParams, ToolParams,
};

const CVE_PROMPT_EMPTY: &str = "No CVEs found.";
const CVE_PROMPT_UNLISTED: &str = "CVE search result.";

/// Which host profile a server instance runs as.
///
/// Both hosts share the same adapters; the profile decides how results are
/// rendered and how failures reach the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// Long-lived host with the full tool catalogue. Upstream failures are
    /// returned as tool results with text `Error: ...`.
    Session,
    /// Minimal stdio host with CVE search and its prompt. Upstream failures
    /// are protocol errors.
    Stdio,
}

impl HostKind {
    /// Rendering used for tool results.
    pub fn output_style(self) -> OutputStyle {
        match self {
            HostKind::Session => OutputStyle::Json,
            HostKind::Stdio => OutputStyle::Summary,
        }
    }
}

/// Opsify MCP server.
///
/// Implements the MCP `ServerHandler` trait over a [`ToolRegistry`].
///
/// # Example
///
/// ```no_run
/// use opsify_mcp::mcp::OpsifyServer;
///
/// # fn main() -> opsify_mcp::Result<()> {
/// let server = OpsifyServer::from_env()?;
/// // Server can now be used with rmcp transport
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpsifyServer {
    client: Arc<OpsifyClient>,
    registry: Arc<ToolRegistry>,
    host: HostKind,
}

impl std::fmt::Debug for OpsifyServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsifyServer")
            .field("host", &self.host)
            .field("tools", &self.registry)
            .finish_non_exhaustive()
    }
}

impl OpsifyServer {
    /// Create a session-host server from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    /// Create a session-host server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = OpsifyClient::from_config(config)?;
        Ok(Self::session(client, config.read_only))
    }

    /// Session host: every tool, or only the read tools.
    pub fn session(client: OpsifyClient, read_only: bool) -> Self {
        Self::new(client, ToolRegistry::session(read_only), HostKind::Session)
    }

    /// Stdio host: CVE search tool and prompt.
    pub fn check(client: OpsifyClient) -> Self {
        Self::new(client, ToolRegistry::cve_only(), HostKind::Stdio)
    }

    /// Create a server with an explicit registry and host profile.
    pub fn new(client: OpsifyClient, registry: ToolRegistry, host: HostKind) -> Self {
        Self {
            client: Arc::new(client),
            registry: Arc::new(registry),
            host,
        }
    }

    /// Host profile of this server.
    pub fn host(&self) -> HostKind {
        self.host
    }

    /// Registered tools.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool descriptors as advertised to clients.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .infos()
            .into_iter()
            .map(|info| Tool::new(info.name, info.description, info.input_schema))
            .collect()
    }

    /// Convert OpsifyError to McpError for errors that are not reported as
    /// tool results.
    fn to_mcp_error(&self, err: OpsifyError) -> McpError {
        if err.is_caller_error() {
            McpError::invalid_params(err.to_string(), None)
        } else {
            McpError::internal_error(err.to_string(), None)
        }
    }

    /// Run one tool call and shape the outcome for this host.
    ///
    /// # Errors
    ///
    /// Unknown tools and invalid arguments are `invalid_params`. In the
    /// stdio host upstream failures are `internal_error`; in the session host
    /// they are returned as an error result instead.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments.unwrap_or_default();
        let outcome = self
            .registry
            .call(&self.client, name, arguments, self.host.output_style())
            .await;

        match outcome {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) if self.host == HostKind::Session && err.is_reportable() => Ok(
                CallToolResult::error(vec![Content::text(format!("Error: {err}"))]),
            ),
            Err(err) => Err(self.to_mcp_error(err)),
        }
    }

    /// Prompt descriptors. Only the stdio host has prompts.
    pub fn prompts(&self) -> Vec<Prompt> {
        match self.host {
            HostKind::Session => Vec::new(),
            HostKind::Stdio => vec![Prompt::new(
                SearchCveParams::NAME,
                Some(SearchCveParams::DESCRIPTION),
                Some(prompt_arguments::<SearchCveParams>()),
            )],
        }
    }

    /// Run the `search_cve` prompt.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for an unknown prompt, missing or invalid
    /// arguments, and `internal_error` if the search fails.
    pub async fn prompt(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<GetPromptResult, McpError> {
        if self.host != HostKind::Stdio || name != SearchCveParams::NAME {
            return Err(McpError::invalid_params(
                format!("Unknown prompt: {name}"),
                None,
            ));
        }

        let arguments = match arguments {
            Some(arguments) if !arguments.is_empty() => arguments,
            _ => {
                return Err(McpError::invalid_params(
                    "At least one filter argument is required.",
                    None,
                ))
            }
        };

        let arguments = coerce_prompt_arguments::<SearchCveParams>(arguments);
        let params = SearchCveParams::validate(arguments).map_err(|e| self.to_mcp_error(e))?;
        let value = params
            .run(&self.client)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let empty = || {
            (
                crate::output::NO_CVES_MESSAGE.to_string(),
                CVE_PROMPT_EMPTY.to_string(),
            )
        };
        let (description, text) = match &value {
            Value::Null => empty(),
            Value::Array(items) if items.is_empty() => empty(),
            Value::Array(items) => (
                format!("Found {} CVEs.", items.len()),
                render_cve_summary(&value).map_err(|e| self.to_mcp_error(e))?,
            ),
            // Not a list: shown the same way the search_cve tool shows it.
            other => (
                CVE_PROMPT_UNLISTED.to_string(),
                render_cve_summary(other).map_err(|e| self.to_mcp_error(e))?,
            ),
        };

        Ok(GetPromptResult {
            description: Some(description),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

/// One optional prompt argument per schema property.
fn prompt_arguments<T: ToolParams>() -> Vec<PromptArgument> {
    let schema = T::input_schema();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, property)| PromptArgument {
            name: name.clone(),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: Some(false),
        })
        .collect()
}

/// Prompt arguments arrive as strings. Convert those whose schema type is
/// numeric so validation sees numbers.
fn coerce_prompt_arguments<T: ToolParams>(arguments: JsonObject) -> JsonObject {
    let schema = T::input_schema();
    let properties = schema.get("properties").and_then(Value::as_object);

    arguments
        .into_iter()
        .map(|(key, value)| {
            let numeric = properties
                .and_then(|props| props.get(&key))
                .is_some_and(is_numeric_schema);
            let value = match value {
                Value::String(raw) if numeric => parse_number(&raw).unwrap_or(Value::String(raw)),
                other => other,
            };
            (key, value)
        })
        .collect()
}

fn is_numeric_schema(property: &Value) -> bool {
    let numeric = |t: &Value| matches!(t.as_str(), Some("integer" | "number"));
    match property.get("type") {
        Some(Value::Array(types)) => types.iter().any(numeric),
        Some(other) => numeric(other),
        None => false,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(Value::Number(n.into()));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

impl ServerHandler for OpsifyServer {
    fn get_info(&self) -> ServerInfo {
        let (prompts, instructions) = match self.host {
            HostKind::Session => (
                None,
                "Opsify MCP Server - Query and manage product releases, products and CVEs.",
            ),
            HostKind::Stdio => (
                Some(PromptsCapability {
                    list_changed: Some(false),
                }),
                "Opsify CVE check server - Search the CVE database.",
            ),
        };

        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                prompts,
                ..Default::default()
            },
            server_info: Implementation {
                name: match self.host {
                    HostKind::Session => "opsify-mcp".to_string(),
                    HostKind::Stdio => "opsify-mcp-check".to_string(),
                },
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(instructions.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(request.name.as_ref(), request.arguments).await
    }

    async fn list_prompts(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            prompts: self.prompts(),
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.prompt(&request.name, request.arguments).await
    }
}
