//! Server configuration.
//!
//! Every setting can be given as a command-line flag or through the
//! environment. [`ConfigArgs::validate`] turns the raw values into an
//! immutable [`Config`] which is then passed to every component that needs
//! it; nothing reads the environment after startup.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser};
use url::Url;

use crate::error::{OpsifyError, Result};

/// Default upstream API location.
pub const DEFAULT_API_URL: &str = "https://api.opsify.dev";

const DEFAULT_RELEASE_ENDPOINT: &str = "/checks/release";
const DEFAULT_PRODUCT_ENDPOINT: &str = "/checks/product";
const DEFAULT_CVE_ENDPOINT: &str = "/checks/cve";

/// MCP transport used by the session host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// HTTP server with server-sent events.
    Sse,
    /// Standard input/output streams.
    Stdio,
}

impl FromStr for Transport {
    type Err = OpsifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" => Ok(Self::Sse),
            "stdio" => Ok(Self::Stdio),
            _ => Err(OpsifyError::Config(
                "TRANSPORT must be either 'sse' or 'stdio'".to_string(),
            )),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sse => f.write_str("sse"),
            Self::Stdio => f.write_str("stdio"),
        }
    }
}

/// Upstream endpoint path templates, one per resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Release (version) resource, e.g. `/checks/release`.
    pub release: String,
    /// Product resource, e.g. `/checks/product`.
    pub product: String,
    /// CVE resource, e.g. `/checks/cve`.
    pub cve: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            release: DEFAULT_RELEASE_ENDPOINT.to_string(),
            product: DEFAULT_PRODUCT_ENDPOINT.to_string(),
            cve: DEFAULT_CVE_ENDPOINT.to_string(),
        }
    }
}

/// Raw configuration as read from flags and environment variables.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Address the SSE transport binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the SSE transport listens on (1-65535).
    #[arg(long, env = "PORT", default_value_t = 8050, allow_negative_numbers = true)]
    pub port: i64,

    /// MCP transport for the session host: `sse` or `stdio`.
    #[arg(long, env = "TRANSPORT", default_value = "sse")]
    pub transport: String,

    /// Base URL of the Opsify API.
    #[arg(long = "api-base-url", env = "OPSIFY_API_BASE_URL", default_value = DEFAULT_API_URL)]
    pub base_url: String,

    /// Opsify API key, sent with every upstream request.
    #[arg(long, env = "OPSIFY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Idle session timeout in seconds.
    #[arg(long, env = "SESSION_TIMEOUT", default_value_t = 3600)]
    pub session_timeout: u64,

    /// Interval between expired-session sweeps, in seconds.
    #[arg(long, env = "SESSION_CLEANUP_INTERVAL", default_value_t = 300)]
    pub session_cleanup_interval: u64,

    /// Timeout for a single upstream request, in seconds.
    #[arg(long, env = "OPSIFY_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Only register tools that do not modify upstream data.
    ///
    /// The environment form accepts `true`/`false`, `1`/`0`, `yes`/`no` and
    /// `on`/`off`.
    #[arg(
        long,
        env = "OPSIFY_READ_ONLY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub read_only: bool,
}

/// Wrapper used to read [`ConfigArgs`] from the environment alone.
#[derive(Parser, Debug)]
struct EnvOnly {
    #[command(flatten)]
    args: ConfigArgs,
}

impl ConfigArgs {
    /// Validate the raw values into a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`OpsifyError::Config`] if the API key or base URL is missing,
    /// the transport is not `sse`/`stdio`, or the port is outside 1-65535.
    pub fn validate(self) -> Result<Config> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                OpsifyError::Config("OPSIFY_API_KEY environment variable is not set".to_string())
            })?;

        if self.base_url.trim().is_empty() {
            return Err(OpsifyError::Config(
                "OPSIFY_API_BASE_URL environment variable is not set".to_string(),
            ));
        }
        let base_url = normalize_base_url(self.base_url.trim())?;

        let transport: Transport = self.transport.parse()?;

        let port = u16::try_from(self.port)
            .ok()
            .filter(|port| *port >= 1)
            .ok_or_else(|| {
                OpsifyError::Config(
                    "PORT must be a valid port number between 1 and 65535".to_string(),
                )
            })?;

        Ok(Config {
            host: self.host,
            port,
            transport,
            base_url,
            api_key,
            endpoints: Endpoints::default(),
            session_timeout: Duration::from_secs(self.session_timeout),
            session_cleanup_interval: Duration::from_secs(self.session_cleanup_interval),
            request_timeout: Duration::from_secs(self.request_timeout),
            read_only: self.read_only,
        })
    }
}

/// Validated, immutable process configuration.
#[derive(Clone)]
pub struct Config {
    /// Bind address for the SSE transport.
    pub host: String,
    /// Bind port for the SSE transport.
    pub port: u16,
    /// Session host transport.
    pub transport: Transport,
    /// Upstream base URL, always ending in `/`.
    pub base_url: Url,
    api_key: String,
    /// Upstream endpoint templates.
    pub endpoints: Endpoints,
    /// Idle session timeout.
    pub session_timeout: Duration,
    /// Expired-session sweep interval.
    pub session_cleanup_interval: Duration,
    /// Per-request upstream timeout.
    pub request_timeout: Duration,
    /// Register read tools only.
    pub read_only: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("transport", &self.transport)
            .field("base_url", &self.base_url.as_str())
            .field("endpoints", &self.endpoints)
            .field("session_timeout", &self.session_timeout)
            .field("session_cleanup_interval", &self.session_cleanup_interval)
            .field("request_timeout", &self.request_timeout)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load and validate configuration from environment variables only.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self> {
        let parsed = EnvOnly::try_parse_from([env!("CARGO_PKG_NAME")])
            .map_err(|e| OpsifyError::Config(e.to_string()))?;
        parsed.args.validate()
    }

    /// Build a configuration directly, using defaults for everything except
    /// the credential and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the URL is invalid.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        ConfigArgs {
            host: "0.0.0.0".to_string(),
            port: 8050,
            transport: Transport::Sse.to_string(),
            base_url: base_url.to_string(),
            api_key: Some(api_key.to_string()),
            session_timeout: 3600,
            session_cleanup_interval: 300,
            request_timeout: 30,
            read_only: false,
        }
        .validate()
    }

    /// The upstream credential.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Parse a base URL, making sure it ends with `/` so relative joins keep any
/// path prefix.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<Url> {
    let with_slash = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Ok(Url::parse(&with_slash)?)
}
