use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/**
 * Lifecycle state reported by the backend for the managed nginx process
 */
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    #[default]
    Stopped,
    Checking,
    Error,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Checking => "checking",
            ServiceStatus::Error => "error",
        }
    }
}

/**
 * Service snapshot as returned by `get_service_info`
 *
 * Produced only by the backend. Stores replace it wholesale and never edit
 * individual fields.
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceInfo {
    pub status: ServiceStatus,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uptime: Option<String>,
    // Pre-formatted by the backend, e.g. "12%"
    #[serde(default)]
    pub cpu_usage: Option<String>,
    #[serde(default)]
    pub memory_usage: Option<String>,
    #[serde(default)]
    pub active_connections: Option<u64>,
    #[serde(default)]
    pub total_connections: Option<u64>,
    #[serde(default)]
    pub requests_per_second: Option<f64>,
}

impl ServiceInfo {
    pub fn is_running(&self) -> bool {
        self.status == ServiceStatus::Running
    }
}

/**
 * The three log files the backend knows about
 */
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Access,
    Error,
    Service,
}

impl LogType {
    pub const ALL: [LogType; 3] = [LogType::Access, LogType::Error, LogType::Service];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Access => "access",
            LogType::Error => "error",
            LogType::Service => "service",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            LogType::Access => 0,
            LogType::Error => 1,
            LogType::Service => 2,
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(LogType::Access),
            "error" => Ok(LogType::Error),
            "service" => Ok(LogType::Service),
            other => Err(format!("Unknown log type: {}", other)),
        }
    }
}

/**
 * Locally held view of one log file
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub content: String,
    pub exists: bool,
}

impl LogRecord {
    pub fn empty(log_type: LogType) -> Self {
        Self {
            log_type,
            content: String::new(),
            exists: false,
        }
    }
}

/**
 * Fixed mapping of log type to record
 *
 * Always holds exactly one record per `LogType`; entries are never added or
 * removed, so every lookup succeeds.
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogBook {
    access: LogRecord,
    error: LogRecord,
    service: LogRecord,
}

impl Default for LogBook {
    fn default() -> Self {
        Self {
            access: LogRecord::empty(LogType::Access),
            error: LogRecord::empty(LogType::Error),
            service: LogRecord::empty(LogType::Service),
        }
    }
}

impl LogBook {
    pub fn get(&self, log_type: LogType) -> &LogRecord {
        match log_type {
            LogType::Access => &self.access,
            LogType::Error => &self.error,
            LogType::Service => &self.service,
        }
    }

    pub fn get_mut(&mut self, log_type: LogType) -> &mut LogRecord {
        match log_type {
            LogType::Access => &mut self.access,
            LogType::Error => &mut self.error,
            LogType::Service => &mut self.service,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        [&self.access, &self.error, &self.service].into_iter()
    }
}
