pub mod audit_logger;
pub mod param_validation;
