//! Chatbot Flow
//!
//! Static conversation flow served to the frontend as-is.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

/// Flow bundled into the binary, used when no override is configured.
pub const BUNDLED_FLOW: &str = include_str!("../assets/chatbot_flow.json");

/// Parses the bundled flow.
pub fn bundled_flow() -> Value {
    serde_json::from_str(BUNDLED_FLOW).unwrap_or_else(|e| {
        warn!("Bundled chatbot flow is not valid JSON: {}", e);
        Value::Null
    })
}

/// Loads the flow from `path`, falling back to the bundled flow when the
/// file is missing or not valid JSON.
pub fn load_flow(path: Option<&Path>) -> Value {
    let Some(path) = path else {
        return bundled_flow();
    };

    match std::fs::read(path).map(|bytes| serde_json::from_slice::<Value>(&bytes)) {
        Ok(Ok(flow)) => {
            info!("Loaded chatbot flow from {}", path.display());
            flow
        }
        Ok(Err(e)) => {
            warn!("Chatbot flow {} is not valid JSON ({}), using bundled flow", path.display(), e);
            bundled_flow()
        }
        Err(e) => {
            warn!("Could not read chatbot flow {} ({}), using bundled flow", path.display(), e);
            bundled_flow()
        }
    }
}
