use thiserror::Error;

use crate::capability::CallShape;

/// Errors raised inside a capability adapter, during construction or a call.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Call shape '{0}' not exposed by this adapter")]
    ShapeUnsupported(CallShape),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Dispatch-time failures surfaced to the transport layer.
///
/// Adapter call failures are not here: they are converted into a
/// `success = false` envelope and never propagate as errors.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Adapter '{0}' exposes no callable shape")]
    NoCallShape(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Schema for '{tool}' lists required field '{field}' that is not declared")]
    UnknownRequiredField { tool: String, field: String },
}
