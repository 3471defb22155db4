use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid parameter value detected: {0}")]
    InvalidParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid response value detected: {0}")]
    InvalidResponse(String),

    #[error("Site data error: {0}")]
    SiteData(String),

    #[error("I/O error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[cfg(feature = "sse")]
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
}

impl AppError {
    /// JSON-RPC error reported to the MCP client for this failure.
    pub fn to_rpc_error(&self) -> rust_mcp_schema::RpcError {
        let code = match self {
            AppError::InvalidParameter(_) | AppError::InvalidContext(_) => rust_mcp_schema::RpcErrorCode::InvalidParams,
            AppError::AccessDenied(_) => rust_mcp_schema::RpcErrorCode::ServerError(-32003),
            AppError::NotFound(_) => rust_mcp_schema::RpcErrorCode::ServerError(-32004),
            _ => rust_mcp_schema::RpcErrorCode::InternalError,
        };
        rust_mcp_schema::RpcError::new(code, self.to_string(), None)
    }
}

impl From<AppError> for rust_mcp_schema::schema_utils::CallToolError {
    fn from(err: AppError) -> Self {
        tracing::error!("AppError converted to CallToolError: {:?}", err);
        rust_mcp_schema::schema_utils::CallToolError::new(err.to_rpc_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_mcp_schema::{RpcError, RpcErrorCode};

    fn code_of(code: RpcErrorCode) -> RpcError {
        RpcError::new(code, String::new(), None)
    }

    #[test]
    fn parameter_and_context_errors_are_invalid_params() {
        let expected = code_of(RpcErrorCode::InvalidParams).code;
        assert_eq!(AppError::InvalidParameter("pagetype".into()).to_rpc_error().code, expected);
        assert_eq!(AppError::InvalidContext("0".into()).to_rpc_error().code, expected);
    }

    #[test]
    fn access_and_lookup_errors_use_server_codes() {
        assert_eq!(
            AppError::AccessDenied("ctx".into()).to_rpc_error().code,
            code_of(RpcErrorCode::ServerError(-32003)).code
        );
        assert_eq!(
            AppError::NotFound("hash".into()).to_rpc_error().code,
            code_of(RpcErrorCode::ServerError(-32004)).code
        );
    }

    #[test]
    fn everything_else_is_internal() {
        let expected = code_of(RpcErrorCode::InternalError).code;
        assert_eq!(AppError::InvalidResponse("name".into()).to_rpc_error().code, expected);
        assert_eq!(AppError::SiteData("bad".into()).to_rpc_error().code, expected);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(AppError::from(io).to_rpc_error().code, expected);
    }

    #[test]
    fn message_carries_the_error_text() {
        let rpc = AppError::AccessDenied("User 9 cannot access context 15".into()).to_rpc_error();
        assert!(rpc.message.contains("User 9 cannot access context 15"));
    }
}
