use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::capability::CallShape;
use crate::error::DispatchError;
use crate::registry::AdapterRegistry;

/// Uniform response wrapper returned for every dispatch, success or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    pub text: String,
    pub raw_result: String,
    pub tool_name: String,
    pub timestamp: String,
}

/// Routes one `(tool_name, parameters)` request to its adapter and
/// normalizes the result.
///
/// No per-tool mutual exclusion: concurrent calls to the same name reach
/// the same adapter instance. Adapters that are not safe for concurrent
/// invocation must serialize internally.
pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    /// Invoke the named tool. Adapter-side failures (errors and panics)
    /// come back as a well-formed `success = false` envelope; only
    /// conditions that preclude invoking anything at all are `Err`.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        params: Value,
    ) -> Result<ToolResponse, DispatchError> {
        let provider = self
            .registry
            .get(tool_name)
            .ok_or_else(|| DispatchError::NotFound(tool_name.to_string()))?;

        // Unreachable given the registry's load-time filter, but checked.
        if provider.adapter().shapes().is_empty() {
            error!("Adapter '{}' lost its call shapes after load", tool_name);
            return Err(DispatchError::NoCallShape(tool_name.to_string()));
        }

        let adapter = provider.adapter();
        let entrypoint = provider.entrypoint;
        info!("Dispatching tool: {} via {}", tool_name, entrypoint);

        // Spawn to contain adapter panics, as well as isolate the call.
        let handle = tokio::spawn(async move {
            match entrypoint {
                CallShape::Execute => adapter.execute(params).await,
                CallShape::Process => adapter.process(params).await,
            }
        });

        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                error!("Adapter '{}' panicked during invocation", tool_name);
                return Ok(ToolResponse {
                    success: false,
                    text: format!("Adapter '{}' panicked during invocation", tool_name),
                    raw_result: Value::Null.to_string(),
                    tool_name: tool_name.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                });
            }
            Err(_) => {
                error!("Adapter '{}' task was cancelled", tool_name);
                return Ok(ToolResponse {
                    success: false,
                    text: format!("Adapter '{}' task was cancelled", tool_name),
                    raw_result: Value::Null.to_string(),
                    tool_name: tool_name.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                });
            }
        };

        // Timestamps mark response construction, after the adapter call.
        match outcome {
            Ok(result) => {
                let text = result.summary();
                let raw = result.into_value();
                Ok(ToolResponse {
                    success: true,
                    text,
                    raw_result: raw.to_string(),
                    tool_name: tool_name.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
            }
            Err(e) => {
                warn!("Tool '{}' failed: {}", tool_name, e);
                Ok(ToolResponse {
                    success: false,
                    text: e.to_string(),
                    raw_result: Value::Null.to_string(),
                    tool_name: tool_name.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
            }
        }
    }
}
