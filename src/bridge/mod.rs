/**
 * ============================================================================
 * BRIDGE MODULE
 * ============================================================================
 * 
 * PURPOSE: Request/response channel from the panel to the privileged backend
 *          that actually supervises nginx
 * 
 * ARCHITECTURE:
 * - commands: Command table, typed payloads and typed call helpers
 * - error: BridgeError and its human-readable message accessor
 * - http: JSON-over-HTTP transport to the local backend helper
 * 
 * Every store talks to the backend only through `CommandBridge`, so the
 * transport can be swapped (HTTP helper, in-process dispatcher, test double).
 * 
 * ============================================================================
 */

pub mod commands;
pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use serde_json::Value;

pub use commands::{Command, LogFilter, LogQuery, LogTarget};
pub use error::BridgeError;
pub use http::HttpBridge;

/**
 * One round trip to the backend
 *
 * `args` is the JSON object of named arguments for `command` (an empty object
 * when the command takes none). The returned value is the command's JSON
 * result, `Value::Null` for commands without one.
 */
#[async_trait]
pub trait CommandBridge: Send + Sync {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, BridgeError>;
}
