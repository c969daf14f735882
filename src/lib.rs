pub mod bridge;
pub mod config;
pub mod routes;
pub mod stores;
pub mod types;

use crate::bridge::{CommandBridge, HttpBridge, LogFilter};
use crate::config::PanelConfig;
use crate::stores::{DerivedStatusStore, ServiceStatusStore, StatusPoller};
use std::sync::Arc;
use std::time::Duration;

/**
 * Owner of the panel's stores
 *
 * Created once at startup and handed to every view; dropping it tears the
 * stores down. Both stores share one bridge.
 */
pub struct PanelContext {
    pub service: Arc<ServiceStatusStore>,
    pub status: Arc<DerivedStatusStore>,
    config: PanelConfig,
}

impl PanelContext {
    pub fn new(bridge: Arc<dyn CommandBridge>, config: PanelConfig) -> Self {
        Self {
            service: Arc::new(ServiceStatusStore::new(Arc::clone(&bridge), config.locale)),
            status: Arc::new(DerivedStatusStore::new(bridge, config.locale)),
            config,
        }
    }

    /// Build a context talking to the backend helper named in `config`
    pub fn connect(config: PanelConfig) -> Result<Self, String> {
        config.validate()?;
        let bridge = HttpBridge::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        log::info!("Using backend at {}", bridge.base_url());
        Ok(Self::new(Arc::new(bridge), config))
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Log query options with the configured line count and no filters
    pub fn default_log_filter(&self) -> LogFilter {
        LogFilter::lines(self.config.default_log_lines)
    }

    pub fn spawn_status_poller(&self) -> StatusPoller {
        StatusPoller::spawn(
            Arc::clone(&self.status),
            Duration::from_secs(self.config.poll_interval_seconds),
        )
    }
}

/**
 * Install the process logger
 * Warnings by default, store lifecycle at info; RUST_LOG overrides
 */
pub fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .filter_module("nginx_panel::stores", log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed by an embedding application
    let _ = builder.try_init();
}
