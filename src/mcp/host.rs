//! Host runners: bind an [`OpsifyServer`] to a transport and run it until
//! the client disconnects or the process is interrupted.

use std::net::SocketAddr;

use rmcp::transport::sse_server::SseServer;
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, Transport};
use crate::error::{OpsifyError, Result};
use crate::mcp::server::OpsifyServer;
use crate::OpsifyClient;

/// Normalise a session token into lowercase 8-4-4-4-12 grouping.
///
/// Accepts hyphenated or bare 32-digit hex. Anything else is returned
/// lowercased with hyphens stripped.
pub fn format_session_id(raw: &str) -> String {
    let hex: String = raw
        .chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect();

    if hex.len() != 32 || !hex.is_ascii() {
        return hex;
    }

    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

/// Fresh random session identifier.
pub fn new_session_id() -> String {
    format_session_id(&Uuid::new_v4().simple().to_string())
}

/// Run the session host with the transport selected in `config`.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the address cannot be
/// bound, or the transport fails.
pub async fn serve_session(config: Config) -> Result<()> {
    let session_id = new_session_id();
    let server = OpsifyServer::from_config(&config)?;

    info!(
        %session_id,
        transport = %config.transport,
        base_url = %config.base_url,
        tools = server.registry().len(),
        read_only = config.read_only,
        "starting session host"
    );
    info!(
        session_timeout_secs = config.session_timeout.as_secs(),
        cleanup_interval_secs = config.session_cleanup_interval.as_secs(),
        "session lifecycle settings"
    );

    match config.transport {
        Transport::Sse => serve_sse(server, &config.host, config.port).await?,
        Transport::Stdio => serve_stdio(server).await?,
    }

    info!(%session_id, "session host stopped");
    Ok(())
}

/// Run the stdio host (CVE search tool and prompt).
///
/// # Errors
///
/// Returns an error if the client cannot be built or the transport fails.
pub async fn serve_check(config: Config) -> Result<()> {
    let client = OpsifyClient::from_config(&config)?;
    let server = OpsifyServer::check(client);
    info!(base_url = %config.base_url, "starting CVE check host on stdio");
    serve_stdio(server).await
}

async fn serve_stdio(server: OpsifyServer) -> Result<()> {
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| OpsifyError::Transport(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| OpsifyError::Transport(e.to_string()))?;
    Ok(())
}

async fn serve_sse(server: OpsifyServer, host: &str, port: u16) -> Result<()> {
    let addr = resolve(host, port).await?;
    let ct = SseServer::serve(addr)
        .await
        .map_err(|e| OpsifyError::Transport(format!("failed to bind {addr}: {e}")))?
        .with_service(move || server.clone());

    info!(%addr, "SSE transport listening");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| OpsifyError::Transport(e.to_string()))?;
    info!("shutdown requested");
    ct.cancel();
    Ok(())
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| OpsifyError::Config(format!("invalid HOST '{host}': {e}")))?
        .next()
        .ok_or_else(|| OpsifyError::Config(format!("HOST '{host}' did not resolve")))
}
