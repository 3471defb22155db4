use crate::config::Config;
use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::error;
use uuid::Uuid;

const MAX_LOGGED_STRING_LEN: usize = 1024;

#[derive(Debug)]
pub struct AuditLogger {
    log_file_path: PathBuf,
    max_size_bytes: u64,
}

impl AuditLogger {
    pub fn new(config: &Config) -> Self {
        // Ensure log directory exists
        if let Some(parent_dir) = config.audit_log_file.parent() {
            if !parent_dir.exists() {
                if let Err(e) = std::fs::create_dir_all(parent_dir) {
                    error!(path = %parent_dir.display(), error = %e, "Failed to create audit log directory");
                }
            }
        }
        Self {
            log_file_path: config.audit_log_file.clone(),
            max_size_bytes: config.audit_log_max_size_bytes,
        }
    }

    async fn rotate_log_if_needed(&self) -> Result<()> {
        if !self.log_file_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_file_path).await?;
        if metadata.len() >= self.max_size_bytes {
            let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            let file_stem = self
                .log_file_path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy();
            let extension = self
                .log_file_path
                .extension()
                .unwrap_or_default()
                .to_string_lossy();

            let backup_file_name = format!("{}_{}.{}", file_stem, timestamp, extension);
            let backup_path = self.log_file_path.with_file_name(backup_file_name);

            fs::rename(&self.log_file_path, backup_path).await?;
        }
        Ok(())
    }

    /// Never fails the call being audited; write errors are only reported.
    pub async fn log_tool_call(&self, tool_name: &str, request_id: &Uuid, arguments: &Value) {
        if let Err(e) = self.try_log_tool_call(tool_name, request_id, arguments).await {
            error!(tool = %tool_name, error = %e, "Failed to write audit log");
        }
    }

    async fn try_log_tool_call(&self, tool_name: &str, request_id: &Uuid, arguments: &Value) -> Result<()> {
        self.rotate_log_if_needed().await?;

        let timestamp = Utc::now().to_rfc3339();
        let args_string = serde_json::to_string(&sanitize(arguments))?;
        let log_entry = format!(
            "{} | {:<20} | {} | Arguments: {}\n",
            timestamp, tool_name, request_id, args_string
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;

        file.write_all(log_entry.as_bytes()).await?;
        Ok(())
    }
}

fn sanitize(arguments: &Value) -> Value {
    let mut sanitized = arguments.clone();
    if let Some(obj) = sanitized.as_object_mut() {
        for (key, value) in obj.iter_mut() {
            if value.as_str().is_some_and(|s| s.len() > MAX_LOGGED_STRING_LEN) {
                *value = Value::String(format!("<{} truncated for log>", key));
            }
        }
    }
    sanitized
}
