use crate::bridge::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/**
 * Display language for status labels and fallback error messages
 */
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" => Ok(Locale::Zh),
            "en" | "en-us" => Ok(Locale::En),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabels {
    pub running: &'static str,
    pub stopped: &'static str,
    pub unknown: &'static str,
}

impl Locale {
    pub fn labels(&self) -> StatusLabels {
        match self {
            Locale::Zh => StatusLabels {
                running: "运行中",
                stopped: "未运行",
                unknown: "未知",
            },
            Locale::En => StatusLabels {
                running: "Running",
                stopped: "Stopped",
                unknown: "Unknown",
            },
        }
    }
}

/**
 * Store operations that can fail
 * Each has a fixed message used when the failure carries none
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchServiceInfo,
    FetchStatus,
    StartService,
    StopService,
    RestartService,
    FetchLogs,
    ClearLogs,
    OpenLogFolder,
    CheckLogExists,
}

impl Operation {
    pub fn fallback_message(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Zh => match self {
                Operation::FetchServiceInfo => "获取服务信息失败",
                Operation::FetchStatus => "获取状态失败",
                Operation::StartService => "启动服务失败",
                Operation::StopService => "停止服务失败",
                Operation::RestartService => "重启服务失败",
                Operation::FetchLogs => "获取日志失败",
                Operation::ClearLogs => "清空日志失败",
                Operation::OpenLogFolder => "打开日志文件夹失败",
                Operation::CheckLogExists => "检查日志文件失败",
            },
            Locale::En => match self {
                Operation::FetchServiceInfo => "Failed to fetch service info",
                Operation::FetchStatus => "Failed to fetch status",
                Operation::StartService => "Failed to start service",
                Operation::StopService => "Failed to stop service",
                Operation::RestartService => "Failed to restart service",
                Operation::FetchLogs => "Failed to fetch logs",
                Operation::ClearLogs => "Failed to clear logs",
                Operation::OpenLogFolder => "Failed to open log folder",
                Operation::CheckLogExists => "Failed to check log file",
            },
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fallback_message(Locale::En))
    }
}

/// Message shown to the user for a failed operation
pub fn failure_message(operation: Operation, locale: Locale, err: &BridgeError) -> String {
    err.message()
        .unwrap_or_else(|| operation.fallback_message(locale).to_string())
}
