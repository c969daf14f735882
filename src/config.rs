/**
 * ============================================================================
 * PANEL CONFIGURATION MODULE
 * ============================================================================
 *
 * PURPOSE: Configuration schema, persistence, and validation
 *
 * STORAGE: Configuration stored as JSON in the user's config directory
 * FILE PATH: {config_dir}/nginx-panel/panel_config.json
 *
 * FUNCTIONALITY:
 * - Define configuration schema with defaults
 * - Validate configuration values
 * - Load configuration from disk
 * - Save configuration atomically
 * - Process-wide cache for settings read at runtime (poll interval)
 *
 * ============================================================================
 */

use crate::stores::Locale;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const APP_DIR_NAME: &str = "nginx-panel";
const CONFIG_FILE_NAME: &str = "panel_config.json";

/**
 * Global cached configuration instance
 * Initialized on startup, hot-updated when settings change
 */
static CACHED_CONFIG: Lazy<RwLock<Option<PanelConfig>>> = Lazy::new(|| RwLock::new(None));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    // Backend helper endpoint (e.g., http://127.0.0.1:17321)
    pub backend_url: String,

    // Per-request timeout for bridge calls
    pub request_timeout_seconds: u64,

    // Language of status labels and fallback error messages
    pub locale: Locale,

    // Number of trailing log lines requested when none is given
    pub default_log_lines: usize,

    // Seconds between status refreshes while polling
    pub poll_interval_seconds: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:17321".to_string(),
            request_timeout_seconds: 10,
            locale: Locale::Zh,
            default_log_lines: 100,
            poll_interval_seconds: 5,
        }
    }
}

impl PanelConfig {
    /**
     * Validate configuration values
     * Returns Ok(()) if valid, Err(String) with validation message if invalid
     */
    pub fn validate(&self) -> Result<(), String> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err("backend_url must start with http:// or https://".to_string());
        }
        if self.request_timeout_seconds < 1 || self.request_timeout_seconds > 300 {
            return Err("request_timeout_seconds must be between 1 and 300".to_string());
        }
        if self.default_log_lines < 1 || self.default_log_lines > 10000 {
            return Err("default_log_lines must be between 1 and 10000".to_string());
        }
        if self.poll_interval_seconds < 1 || self.poll_interval_seconds > 3600 {
            return Err("poll_interval_seconds must be between 1 and 3600".to_string());
        }
        Ok(())
    }
}

/**
 * Get path to configuration file
 * Returns {config_dir}/nginx-panel/panel_config.json
 */
pub fn config_path() -> Result<PathBuf, String> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| "Failed to resolve user config directory".to_string())?;

    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load_config() -> Result<PanelConfig, String> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &PanelConfig) -> Result<(), String> {
    save_config_to(&config_path()?, config)
}

/**
 * Load configuration from a file
 * Returns default configuration if the file doesn't exist
 */
pub fn load_config_from(config_path: &Path) -> Result<PanelConfig, String> {
    if !config_path.exists() {
        log::info!("Panel config not found, using defaults");
        return Ok(PanelConfig::default());
    }

    let json_str = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    let config: PanelConfig = serde_json::from_str(&json_str)
        .map_err(|e| format!("Failed to parse config JSON: {}", e))?;

    config.validate()?;

    log::info!("Loaded panel config from {}", config_path.display());
    Ok(config)
}

/**
 * Save configuration atomically
 * Uses temporary file + rename to prevent corruption
 */
pub fn save_config_to(config_path: &Path, config: &PanelConfig) -> Result<(), String> {
    config.validate()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let json_str = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    let temp_path = config_path.with_extension("json.tmp");
    fs::write(&temp_path, json_str)
        .map_err(|e| format!("Failed to write temporary config file: {}", e))?;

    fs::rename(&temp_path, config_path)
        .map_err(|e| format!("Failed to save config file: {}", e))?;

    log::info!("Saved panel config to {}", config_path.display());
    Ok(())
}

// A poisoned lock still holds a usable config
fn write_cache() -> std::sync::RwLockWriteGuard<'static, Option<PanelConfig>> {
    CACHED_CONFIG.write().unwrap_or_else(|e| e.into_inner())
}

pub fn init_cache(config: PanelConfig) {
    *write_cache() = Some(config);
    log::info!("Panel config cache initialized");
}

/**
 * Update config cache without restart
 * Running pollers pick up the new interval on their next tick; an invalid
 * config is rejected and the cached one kept
 */
pub fn update_cache(config: PanelConfig) -> Result<(), String> {
    config.validate()?;
    log::info!(
        "Panel config cache updated (poll interval {}s)",
        config.poll_interval_seconds
    );
    *write_cache() = Some(config);
    Ok(())
}

pub fn get_cached_config() -> Option<PanelConfig> {
    CACHED_CONFIG
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

pub fn clear_cache() {
    *write_cache() = None;
    log::info!("Panel config cache cleared");
}
