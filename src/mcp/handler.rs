use crate::config::Config;
use crate::mcp::schemas::*;
use crate::site::SiteServices;
use crate::tools::addable_blocks_tool::{AddableBlocksFetcher, FetchAddableBlocksParams};
use crate::utils::audit_logger::AuditLogger;

use async_trait::async_trait;
use rust_mcp_sdk::mcp_server::ServerHandler;
use rust_mcp_sdk::McpServer;
use rust_mcp_schema::{
    CallToolRequest, CallToolResult, ListToolsRequest, ListToolsResult, Tool,
    schema_utils::CallToolError,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

pub const FETCH_ADDABLE_BLOCKS: &str = "fetch_addable_blocks";
pub const GET_CONFIG: &str = "get_config";

// Everything a tool call may need, built once from the config and the site.
#[derive(Debug)]
pub struct AppManagers {
    config: Arc<Config>,
    audit_logger: AuditLogger,
    addable_blocks: AddableBlocksFetcher,
}

impl AppManagers {
    pub fn new(config: Arc<Config>, site: SiteServices) -> Self {
        let audit_logger = AuditLogger::new(&config);
        let addable_blocks = AddableBlocksFetcher::new(config.clone(), site);
        Self {
            config,
            audit_logger,
            addable_blocks,
        }
    }
}

#[derive(Debug)]
pub struct PageBlocksServerHandler {
    managers: Arc<AppManagers>,
}

impl PageBlocksServerHandler {
    pub fn new(config: Arc<Config>, site: SiteServices) -> Self {
        Self {
            managers: Arc::new(AppManagers::new(config, site)),
        }
    }

    pub fn tools() -> Vec<Tool> {
        vec![
            Tool {
                name: FETCH_ADDABLE_BLOCKS.to_string(),
                description: Some(fetch_addable_blocks_description()),
                input_schema: fetch_addable_blocks_schema(),
            },
            Tool {
                name: GET_CONFIG.to_string(),
                description: Some("Get current server configuration.".to_string()),
                input_schema: get_config_schema(),
            },
        ]
    }
}

#[async_trait]
impl ServerHandler for PageBlocksServerHandler {
    #[instrument(skip(self, _request, _runtime))]
    async fn handle_list_tools_request(
        &self,
        _request: ListToolsRequest,
        _runtime: &dyn McpServer,
    ) -> Result<ListToolsResult, rust_mcp_schema::RpcError> {
        info!("Handling list_tools request");
        Ok(ListToolsResult { tools: Self::tools(), meta: None, next_cursor: None })
    }

    #[instrument(skip(self, request, _runtime), fields(tool_name = %request.params.name, request_id = tracing::field::Empty))]
    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: &dyn McpServer,
    ) -> Result<CallToolResult, CallToolError> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(&request_id));
        info!("Handling call_tool request for: {}", request.params.name);

        let args = request.params.arguments.unwrap_or_default();
        self.managers
            .audit_logger
            .log_tool_call(&request.params.name, &request_id, &Value::Object(args.clone()))
            .await;

        self.dispatch(&request.params.name, args).await
    }
}

impl PageBlocksServerHandler {
    async fn dispatch(
        &self,
        name: &str,
        args: serde_json::Map<String, Value>,
    ) -> Result<CallToolResult, CallToolError> {
        match name {
            FETCH_ADDABLE_BLOCKS => {
                let params: FetchAddableBlocksParams = serde_json::from_value(Value::Object(args))
                    .map_err(|e| CallToolError::invalid_params(e.to_string()))?;
                let result = self.managers.addable_blocks.fetch_addable_blocks(&params).await?;
                Ok(CallToolResult::from_serializable(&result)?)
            }
            GET_CONFIG => {
                let config_clone = self.managers.config.as_ref().clone();
                Ok(CallToolResult::from_serializable(&config_clone)?)
            }
            _ => {
                error!("Unknown tool called: {}", name);
                Err(CallToolError::unknown_tool(name.to_string()))
            }
        }
    }
}
