use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// Records consumed by the config-management views. The stores in this crate
// only pass them through.

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFileType {
    Main,
    Site,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFileStatus {
    Valid,
    Invalid,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: ConfigFileType,
    pub path: String,
    pub size: String,
    #[serde(rename = "lastModified")]
    pub last_modified: String,
    #[serde(default)]
    pub status: ConfigFileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/**
 * A site served by the managed nginx instance
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub id: String,
    pub name: String,
    pub path: String,
    pub domain: String,
    pub port: u16,
    pub root: String,
    pub index: Vec<String>,
    pub php: bool,
    pub ssl: bool,
    pub remark: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl ProjectConfig {
    /// Address the site is reachable on, e.g. `https://example.test:8443`
    pub fn url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let default_port = if self.ssl { 443 } else { 80 };
        if self.port == default_port {
            format!("{}://{}", scheme, self.domain)
        } else {
            format!("{}://{}:{}", scheme, self.domain, self.port)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    pub content: String,
    pub remark: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}
