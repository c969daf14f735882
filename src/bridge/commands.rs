/**
 * ============================================================================
 * BRIDGE COMMANDS
 * ============================================================================
 *
 * PURPOSE: The backend command table and typed wrappers around it
 *
 * | Command          | Payload                          | Response    |
 * |------------------|----------------------------------|-------------|
 * | get_service_info | none                             | ServiceInfo |
 * | start_nginx      | none                             | none        |
 * | stop_nginx       | none                             | none        |
 * | restart_nginx    | none                             | none        |
 * | get_nginx_logs   | {logType, lines, search?, level?}| string      |
 * | clear_logs       | {logType}                        | none        |
 * | open_log_folder  | none                             | none        |
 * | check_log_exists | {logType}                        | boolean     |
 *
 * ============================================================================
 */

use crate::bridge::{BridgeError, CommandBridge};
use crate::types::{LogType, ServiceInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetServiceInfo,
    StartNginx,
    StopNginx,
    RestartNginx,
    GetNginxLogs,
    ClearLogs,
    OpenLogFolder,
    CheckLogExists,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::GetServiceInfo,
        Command::StartNginx,
        Command::StopNginx,
        Command::RestartNginx,
        Command::GetNginxLogs,
        Command::ClearLogs,
        Command::OpenLogFolder,
        Command::CheckLogExists,
    ];

    /// Wire name understood by the backend
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetServiceInfo => "get_service_info",
            Command::StartNginx => "start_nginx",
            Command::StopNginx => "stop_nginx",
            Command::RestartNginx => "restart_nginx",
            Command::GetNginxLogs => "get_nginx_logs",
            Command::ClearLogs => "clear_logs",
            Command::OpenLogFolder => "open_log_folder",
            Command::CheckLogExists => "check_log_exists",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
 * Caller-facing log query options
 * Filtering happens on the backend; `lines` counts from the end of the file
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub lines: usize,
    pub search: Option<String>,
    pub level: Option<String>,
}

impl LogFilter {
    pub const DEFAULT_LINES: usize = 100;

    pub fn lines(lines: usize) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            lines: Self::DEFAULT_LINES,
            search: None,
            level: None,
        }
    }
}

/// Payload of `get_nginx_logs`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub log_type: LogType,
    pub lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl LogQuery {
    pub fn new(log_type: LogType, filter: &LogFilter) -> Self {
        // Blank filters mean "no filter"
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            log_type,
            lines: filter.lines,
            search: non_blank(&filter.search),
            level: non_blank(&filter.level),
        }
    }
}

/// Payload of `clear_logs` and `check_log_exists`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogTarget {
    pub log_type: LogType,
}

fn encode<P: Serialize>(command: Command, payload: &P) -> Result<Value, BridgeError> {
    serde_json::to_value(payload).map_err(|source| BridgeError::Payload {
        command: command.name().to_string(),
        source,
    })
}

async fn call<T: DeserializeOwned>(
    bridge: &dyn CommandBridge,
    command: Command,
    args: Value,
) -> Result<T, BridgeError> {
    log::debug!("Invoking {}", command);
    let value = bridge.invoke(command, args).await?;
    serde_json::from_value(value).map_err(|source| BridgeError::Payload {
        command: command.name().to_string(),
        source,
    })
}

// Result of a command with no response body is discarded
async fn call_unit(
    bridge: &dyn CommandBridge,
    command: Command,
    args: Value,
) -> Result<(), BridgeError> {
    log::debug!("Invoking {}", command);
    bridge.invoke(command, args).await.map(|_| ())
}

pub async fn get_service_info(bridge: &dyn CommandBridge) -> Result<ServiceInfo, BridgeError> {
    call(bridge, Command::GetServiceInfo, json!({})).await
}

pub async fn start_nginx(bridge: &dyn CommandBridge) -> Result<(), BridgeError> {
    call_unit(bridge, Command::StartNginx, json!({})).await
}

pub async fn stop_nginx(bridge: &dyn CommandBridge) -> Result<(), BridgeError> {
    call_unit(bridge, Command::StopNginx, json!({})).await
}

pub async fn restart_nginx(bridge: &dyn CommandBridge) -> Result<(), BridgeError> {
    call_unit(bridge, Command::RestartNginx, json!({})).await
}

pub async fn get_nginx_logs(
    bridge: &dyn CommandBridge,
    query: &LogQuery,
) -> Result<String, BridgeError> {
    let args = encode(Command::GetNginxLogs, query)?;
    call(bridge, Command::GetNginxLogs, args).await
}

pub async fn clear_logs(bridge: &dyn CommandBridge, log_type: LogType) -> Result<(), BridgeError> {
    let args = encode(Command::ClearLogs, &LogTarget { log_type })?;
    call_unit(bridge, Command::ClearLogs, args).await
}

pub async fn open_log_folder(bridge: &dyn CommandBridge) -> Result<(), BridgeError> {
    call_unit(bridge, Command::OpenLogFolder, json!({})).await
}

pub async fn check_log_exists(
    bridge: &dyn CommandBridge,
    log_type: LogType,
) -> Result<bool, BridgeError> {
    let args = encode(Command::CheckLogExists, &LogTarget { log_type })?;
    call(bridge, Command::CheckLogExists, args).await
}
