use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub site_data_file: PathBuf,
    pub caller_user_id: u64,
    pub language: String,
    pub log_level: String,
    pub transport_mode: TransportMode,
    pub sse_host: String,
    pub sse_port: u16,
    pub audit_log_file: PathBuf,
    pub audit_log_max_size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Stdio,
    Sse,
}

impl FromStr for TransportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "sse" => Ok(TransportMode::Sse),
            _ => Err(anyhow::anyhow!("Invalid transport mode: {}", s)),
        }
    }
}

fn expand_tilde(path_str: &str) -> Result<PathBuf, anyhow::Error> {
    // `shellexpand::tilde` is infallible.
    Ok(PathBuf::from(shellexpand::tilde(path_str).as_ref()))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `load` feeds it the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_data_str = lookup("SITE_DATA_FILE")
            .filter(|s| !s.is_empty())
            .context("SITE_DATA_FILE environment variable must be set")?;
        let site_data_file = dunce::canonicalize(expand_tilde(&site_data_str)?)
            .context(format!("Failed to canonicalize SITE_DATA_FILE: {}", site_data_str))?;
        if !site_data_file.is_file() {
            anyhow::bail!("SITE_DATA_FILE is not a regular file: {:?}", site_data_file);
        }

        let caller_user_id = lookup("MCP_CALLER_USER_ID")
            .context("MCP_CALLER_USER_ID environment variable must be set")?
            .trim()
            .parse::<u64>()
            .context("Invalid MCP_CALLER_USER_ID")?;

        let language = lookup("SITE_LANG")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "en".to_string());

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let transport_mode_str = lookup("MCP_TRANSPORT").unwrap_or_else(|| "stdio".to_string());
        let transport_mode = TransportMode::from_str(&transport_mode_str)?;

        let sse_host = lookup("MCP_SSE_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let sse_port = lookup("MCP_SSE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("Invalid MCP_SSE_PORT")?;

        let log_dir_base = match lookup("MCP_LOG_DIR").filter(|s| !s.is_empty()) {
            Some(dir) => expand_tilde(&dir)?,
            None => site_data_file
                .parent()
                .map(|p| p.join(".mcp-logs"))
                .unwrap_or_else(|| PathBuf::from(".mcp-logs")),
        };
        let audit_log_file = log_dir_base.join("tool_calls.log");
        let audit_log_max_size_bytes = lookup("AUDIT_LOG_MAX_SIZE_MB")
            .unwrap_or_else(|| "10".to_string()) // Default 10 MB
            .parse::<u64>()
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(10 * 1024 * 1024);

        Ok(Config {
            site_data_file,
            caller_user_id,
            language,
            log_level,
            transport_mode,
            sse_host,
            sse_port,
            audit_log_file,
            audit_log_max_size_bytes,
        })
    }
}
