mod config;
mod error;
mod mcp;
mod site;
mod tools;
mod utils;

use crate::config::{Config, TransportMode};
use crate::mcp::handler::PageBlocksServerHandler;
use crate::site::store::SiteSnapshot;
use crate::site::SiteServices;
use anyhow::{Context, Result};
use rust_mcp_schema::{InitializeResult, Implementation, ServerCapabilities, ServerCapabilitiesTools, LATEST_PROTOCOL_VERSION};
use rust_mcp_sdk::error::McpSdkError;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, FmtSubscriber, fmt::format::FmtSpan};

#[cfg(feature = "stdio")]
use rust_mcp_transport::{StdioTransport, TransportOptions};
#[cfg(feature = "sse")]
use rust_mcp_sdk::mcp_server::hyper_server::create_server as create_sse_server;
#[cfg(feature = "sse")]
use rust_mcp_sdk::mcp_server::{HyperServer, HyperServerOptions};
#[cfg(feature = "stdio")]
use rust_mcp_sdk::mcp_server::server_runtime::create_server as create_stdio_server;
#[cfg(feature = "stdio")]
use rust_mcp_sdk::mcp_server::ServerRuntime;
#[cfg(feature = "stdio")]
use rust_mcp_sdk::McpServer;

fn setup_logging(log_level_str: &str) -> Result<()> {
    let level = match log_level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mcp_page_blocks={}", level)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn get_server_details() -> InitializeResult {
    InitializeResult {
        server_info: Implementation {
            name: "mcp-page-blocks".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "Answers which blocks can still be added to a site page. \
            Call `fetch_addable_blocks` with either a `pagehash` from an edit session or \
            `pagecontextid`, `pagetype`, `pagelayout` and optionally `subpage`. \
            Use `get_config` to see which user the server acts as.".to_string()
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    }
}

fn map_mcp_sdk_error(err: McpSdkError) -> anyhow::Error {
    anyhow::anyhow!("MCP SDK Error: {:?}", err)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(Config::load().context("Failed to load configuration")?);
    setup_logging(&config.log_level)?;

    tracing::info!(version = %env!("CARGO_PKG_VERSION"), "Starting mcp-page-blocks server");
    tracing::debug!("Loaded configuration: {:?}", config);

    let snapshot = SiteSnapshot::load(&config.site_data_file)
        .await
        .with_context(|| format!("Failed to load site data from {}", config.site_data_file.display()))?;
    let site = SiteServices::from_snapshot(snapshot, &config.language);

    let server_details = get_server_details();
    let handler = PageBlocksServerHandler::new(config.clone(), site);

    match config.transport_mode {
        #[cfg(feature = "stdio")]
        TransportMode::Stdio => {
            tracing::info!("Using STDIO transport mode.");
            let transport_opts = TransportOptions::default();
            let transport = StdioTransport::new(transport_opts)
                .map_err(|e| anyhow::anyhow!("Failed to create StdioTransport: {}", e))?;
            let server_runtime: ServerRuntime = create_stdio_server(server_details, transport, handler);
            server_runtime.start().await.map_err(map_mcp_sdk_error)?;
        }
        #[cfg(feature = "sse")]
        TransportMode::Sse => {
            tracing::info!(host = %config.sse_host, port = %config.sse_port, "Using SSE transport mode.");
            let sse_options = HyperServerOptions {
                host: config.sse_host.clone(),
                port: config.sse_port,
                enable_cors: true,
                ..Default::default()
            };
            let sse_server_runtime: HyperServer = create_sse_server(server_details, handler, sse_options);
            sse_server_runtime.start().await.map_err(|e| map_mcp_sdk_error(e.into()))?;
        }
        #[cfg(not(all(feature = "stdio", feature = "sse")))]
        #[allow(unreachable_patterns)]
        _ => {
            let available_feature = if cfg!(feature = "stdio") { "stdio" } else if cfg!(feature = "sse") { "sse" } else { "none" };
            tracing::error!(
                selected_transport = ?config.transport_mode,
                available_feature = %available_feature,
                "Selected transport mode is not available due to compiled features."
            );
            anyhow::bail!(
                "Selected transport mode {:?} is not available. Compiled with {} support only.",
                config.transport_mode, available_feature
            );
        }
    }

    tracing::info!("Server shutdown.");
    Ok(())
}
