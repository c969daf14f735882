/**
 * ============================================================================
 * DERIVED STATUS STORE
 * ============================================================================
 *
 * PURPOSE: UI-ready service status: localized status text, display strings
 *          with defaults for missing data, and an initialization flag
 *
 * BEHAVIOR:
 * - fetch_status and the control operations report their outcome to the
 *   caller as an `OpOutcome` in addition to updating `error`
 * - A failed status fetch degrades the view to a defaulted "stopped" snapshot
 * - initialize always ends with `initialized = true`
 * - reset_state restores the initial snapshot without contacting the backend
 *
 * ============================================================================
 */

use crate::bridge::{commands, BridgeError, CommandBridge};
use crate::stores::messages::{failure_message, Locale, Operation};
use crate::stores::tracking::{Freshness, HasLoading, InFlight, LoadingGuard};
use crate::types::ServiceInfo;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

const DEFAULT_UPTIME: &str = "0s";
const DEFAULT_USAGE: &str = "0%";

/**
 * Result of a state-changing operation, for callers that branch on it
 */
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
        }
    }
}

/**
 * Display fields computed from a `ServiceInfo`
 */
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub is_running: bool,
    pub status_text: String,
    pub version: String,
    pub uptime: String,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub active_connections: u64,
    pub total_connections: u64,
    pub requests_per_second: f64,
}

impl StatusView {
    /**
     * Pure derivation from the backend snapshot
     *
     * Anything other than "running" yields the stopped view: usage and
     * connection figures are zeroed, only the version is carried over.
     */
    pub fn derive(info: &ServiceInfo, locale: Locale) -> Self {
        let labels = locale.labels();
        let version = info
            .version
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| labels.unknown.to_string());

        if !info.is_running() {
            return Self {
                version,
                ..Self::stopped(locale)
            };
        }

        let or_default = |value: &Option<String>, default: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            is_running: true,
            status_text: labels.running.to_string(),
            version,
            uptime: or_default(&info.uptime, DEFAULT_UPTIME),
            cpu_usage: or_default(&info.cpu_usage, DEFAULT_USAGE),
            memory_usage: or_default(&info.memory_usage, DEFAULT_USAGE),
            active_connections: info.active_connections.unwrap_or(0),
            total_connections: info.total_connections.unwrap_or(0),
            requests_per_second: info.requests_per_second.unwrap_or(0.0),
        }
    }

    /// Fully defaulted stopped view, also used when the backend is unreachable
    pub fn stopped(locale: Locale) -> Self {
        let labels = locale.labels();
        Self {
            is_running: false,
            status_text: labels.stopped.to_string(),
            version: labels.unknown.to_string(),
            uptime: DEFAULT_UPTIME.to_string(),
            cpu_usage: DEFAULT_USAGE.to_string(),
            memory_usage: DEFAULT_USAGE.to_string(),
            active_connections: 0,
            total_connections: 0,
            requests_per_second: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub is_running: bool,
    pub status_text: String,
    pub version: String,
    pub uptime: String,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub active_connections: u64,
    pub total_connections: u64,
    pub requests_per_second: f64,
    pub initialized: bool,
    pub error: String,
    pub loading: bool,
}

impl ViewState {
    /// Snapshot before the first fetch
    pub fn initial(locale: Locale) -> Self {
        Self {
            is_running: false,
            status_text: locale.labels().unknown.to_string(),
            version: String::new(),
            uptime: String::new(),
            cpu_usage: DEFAULT_USAGE.to_string(),
            memory_usage: DEFAULT_USAGE.to_string(),
            active_connections: 0,
            total_connections: 0,
            requests_per_second: 0.0,
            initialized: false,
            error: String::new(),
            loading: false,
        }
    }

    fn apply(&mut self, view: StatusView) {
        self.is_running = view.is_running;
        self.status_text = view.status_text;
        self.version = view.version;
        self.uptime = view.uptime;
        self.cpu_usage = view.cpu_usage;
        self.memory_usage = view.memory_usage;
        self.active_connections = view.active_connections;
        self.total_connections = view.total_connections;
        self.requests_per_second = view.requests_per_second;
    }
}

impl HasLoading for ViewState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

pub struct DerivedStatusStore {
    bridge: Arc<dyn CommandBridge>,
    locale: Locale,
    state: watch::Sender<ViewState>,
    in_flight: InFlight,
    freshness: Freshness,
}

impl DerivedStatusStore {
    pub fn new(bridge: Arc<dyn CommandBridge>, locale: Locale) -> Self {
        let (state, _) = watch::channel(ViewState::initial(locale));
        Self {
            bridge,
            locale,
            state,
            in_flight: InFlight::default(),
            freshness: Freshness::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running
    }

    pub fn status_text(&self) -> String {
        self.state.borrow().status_text.clone()
    }

    pub fn version(&self) -> String {
        self.state.borrow().version.clone()
    }

    pub fn uptime(&self) -> String {
        self.state.borrow().uptime.clone()
    }

    pub fn cpu_usage(&self) -> String {
        self.state.borrow().cpu_usage.clone()
    }

    pub fn memory_usage(&self) -> String {
        self.state.borrow().memory_usage.clone()
    }

    pub fn active_connections(&self) -> u64 {
        self.state.borrow().active_connections
    }

    pub fn total_connections(&self) -> u64 {
        self.state.borrow().total_connections
    }

    pub fn requests_per_second(&self) -> f64 {
        self.state.borrow().requests_per_second
    }

    pub fn initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn error(&self) -> String {
        self.state.borrow().error.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /**
     * Query the backend and rewrite the derived fields
     *
     * On failure the view falls back to the defaulted stopped snapshot and the
     * message is both stored in `error` and returned.
     */
    pub async fn fetch_status(&self) -> OpOutcome {
        let _loading = self.begin();
        let ticket = self.freshness.ticket();
        let result = commands::get_service_info(self.bridge.as_ref()).await;
        let current = self.freshness.accept(ticket);
        if !current {
            log::debug!("Discarding stale status (request #{})", ticket);
        }

        match result {
            Ok(info) => {
                if current {
                    let view = StatusView::derive(&info, self.locale);
                    self.state.send_modify(|s| {
                        s.apply(view);
                        s.error.clear();
                    });
                }
                OpOutcome::ok()
            }
            Err(e) => {
                log::error!("{}: {}", Operation::FetchStatus, e);
                let message = failure_message(Operation::FetchStatus, self.locale, &e);
                if current {
                    let view = StatusView::stopped(self.locale);
                    let error = message.clone();
                    self.state.send_modify(|s| {
                        s.apply(view);
                        s.error = error;
                    });
                }
                OpOutcome::failed(message)
            }
        }
    }

    pub async fn start_service(&self) -> OpOutcome {
        self.control(
            Operation::StartService,
            commands::start_nginx(self.bridge.as_ref()),
        )
        .await
    }

    pub async fn stop_service(&self) -> OpOutcome {
        self.control(
            Operation::StopService,
            commands::stop_nginx(self.bridge.as_ref()),
        )
        .await
    }

    pub async fn restart_service(&self) -> OpOutcome {
        self.control(
            Operation::RestartService,
            commands::restart_nginx(self.bridge.as_ref()),
        )
        .await
    }

    /**
     * First load of the view
     * Marks the store initialized whatever the outcome, unless reset_state
     * ran while it was pending; calling it again performs another full fetch
     */
    pub async fn initialize(&self) -> OpOutcome {
        let _loading = self.begin();
        let epoch = self.freshness.epoch();
        let outcome = self.fetch_status().await;

        // A reset issued meanwhile wins; the store stays uninitialized
        let marked = self.state.send_if_modified(|s| {
            if self.freshness.epoch() != epoch {
                return false;
            }
            s.initialized = true;
            true
        });
        if !marked {
            log::debug!("Status store reset during initialization");
        } else if outcome.success {
            log::info!("Status store initialized");
        } else {
            log::warn!("Status store initialized without backend data");
        }
        outcome
    }

    /// Back to the initial snapshot; pending fetches are discarded on arrival
    pub fn reset_state(&self) {
        self.freshness.invalidate();
        let initial = ViewState::initial(self.locale);
        self.state.send_modify(|s| {
            *s = initial;
            s.loading = self.in_flight.is_active();
        });
    }

    fn begin(&self) -> LoadingGuard<'_, ViewState> {
        let guard = self.in_flight.enter(&self.state);
        self.state.send_modify(|s| s.error.clear());
        guard
    }

    async fn control(
        &self,
        operation: Operation,
        request: impl Future<Output = Result<(), BridgeError>>,
    ) -> OpOutcome {
        let _loading = self.begin();
        match request.await {
            Ok(()) => self.fetch_status().await,
            Err(e) => {
                log::error!("{}: {}", operation, e);
                let message = failure_message(operation, self.locale, &e);
                let error = message.clone();
                self.state.send_modify(|s| s.error = error);
                OpOutcome::failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::scripted::ScriptedBridge;
    use crate::bridge::Command;
    use crate::types::ServiceStatus;
    use serde_json::json;

    fn store_with(bridge: &Arc<ScriptedBridge>) -> DerivedStatusStore {
        DerivedStatusStore::new(Arc::clone(bridge) as Arc<dyn CommandBridge>, Locale::Zh)
    }

    #[test]
    fn test_derive_stopped_keeps_version_only() {
        let info = ServiceInfo {
            status: ServiceStatus::Stopped,
            version: Some("1.25.0".to_string()),
            cpu_usage: Some("40%".to_string()),
            active_connections: Some(9),
            ..ServiceInfo::default()
        };
        let view = StatusView::derive(&info, Locale::Zh);
        assert!(!view.is_running);
        assert_eq!(view.status_text, "未运行");
        assert_eq!(view.version, "1.25.0");
        assert_eq!(view.cpu_usage, "0%");
        assert_eq!(view.uptime, "0s");
        assert_eq!(view.active_connections, 0);
    }

    #[test]
    fn test_derive_treats_checking_and_error_as_stopped() {
        for status in [ServiceStatus::Checking, ServiceStatus::Error] {
            let info = ServiceInfo {
                status,
                ..ServiceInfo::default()
            };
            let view = StatusView::derive(&info, Locale::En);
            assert!(!view.is_running);
            assert_eq!(view.status_text, "Stopped");
            assert_eq!(view.version, "Unknown");
        }
    }

    #[test]
    fn test_derive_running_fills_missing_fields() {
        let info = ServiceInfo {
            status: ServiceStatus::Running,
            cpu_usage: Some("5%".to_string()),
            active_connections: Some(12),
            ..ServiceInfo::default()
        };
        let view = StatusView::derive(&info, Locale::Zh);
        assert!(view.is_running);
        assert_eq!(view.status_text, "运行中");
        assert_eq!(view.version, "未知");
        assert_eq!(view.cpu_usage, "5%");
        assert_eq!(view.memory_usage, "0%");
        assert_eq!(view.uptime, "0s");
        assert_eq!(view.active_connections, 12);
        assert_eq!(view.total_connections, 0);
        assert_eq!(view.requests_per_second, 0.0);
    }

    #[test]
    fn test_view_state_serializes_camel_case() {
        let json = serde_json::to_value(ViewState::initial(Locale::Zh)).unwrap();
        assert_eq!(json["statusText"], "未知");
        assert_eq!(json["cpuUsage"], "0%");
        assert_eq!(json["initialized"], false);
    }

    #[tokio::test]
    async fn test_fetch_status_for_stopped_backend() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(
            Command::GetServiceInfo,
            Ok(json!({"status": "stopped", "version": "1.25.0"})),
        );
        let store = store_with(&bridge);

        let outcome = store.fetch_status().await;

        assert_eq!(outcome, OpOutcome::ok());
        let state = store.snapshot();
        assert!(!state.is_running);
        assert_eq!(state.status_text, "未运行");
        assert_eq!(state.version, "1.25.0");
        assert_eq!(state.cpu_usage, "0%");
        assert_eq!(state.active_connections, 0);
        assert_eq!(state.error, "");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_fetch_status_for_running_backend() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(
            Command::GetServiceInfo,
            Ok(json!({"status": "running", "cpu_usage": "5%", "active_connections": 12})),
        );
        let store = store_with(&bridge);

        store.fetch_status().await;

        assert!(store.is_running());
        assert_eq!(store.version(), "未知");
        assert_eq!(store.cpu_usage(), "5%");
        assert_eq!(store.active_connections(), 12);
        assert_eq!(store.status_text(), "运行中");
    }

    #[tokio::test]
    async fn test_fetch_status_failure_degrades_view_and_reports() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(
            Command::GetServiceInfo,
            Ok(json!({"status": "running", "version": "1.24.0", "active_connections": 3})),
        );
        bridge.fail(Command::GetServiceInfo, None);
        let store = store_with(&bridge);

        store.fetch_status().await;
        let outcome = store.fetch_status().await;

        assert_eq!(outcome, OpOutcome::failed("获取状态失败".to_string()));
        assert!(!store.is_running());
        assert_eq!(store.status_text(), "未运行");
        assert_eq!(store.version(), "未知");
        assert_eq!(store.active_connections(), 0);
        assert_eq!(store.error(), "获取状态失败");
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_control_propagates_fetch_outcome() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(Command::RestartNginx, Ok(serde_json::Value::Null));
        bridge.respond(Command::GetServiceInfo, Ok(json!({"status": "running"})));
        let store = store_with(&bridge);

        let outcome = store.restart_service().await;

        assert!(outcome.success);
        assert!(store.is_running());
        assert_eq!(bridge.count(Command::GetServiceInfo), 1);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_failed_control_synthesizes_failure_without_fetch() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.fail(Command::StartNginx, Some("nginx.exe not found"));
        let store = store_with(&bridge);

        let outcome = store.start_service().await;

        assert_eq!(outcome, OpOutcome::failed("nginx.exe not found".to_string()));
        assert_eq!(store.error(), "nginx.exe not found");
        assert_eq!(bridge.count(Command::GetServiceInfo), 0);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_stop_failure_uses_fallback() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.fail(Command::StopNginx, None);
        let store = store_with(&bridge);

        let outcome = store.stop_service().await;
        assert_eq!(outcome.message.as_deref(), Some("停止服务失败"));
    }

    #[tokio::test]
    async fn test_initialize_marks_initialized_even_on_failure() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.fail(Command::GetServiceInfo, Some("connection refused"));
        let store = store_with(&bridge);
        assert!(!store.initialized());

        let outcome = store.initialize().await;

        assert!(!outcome.success);
        assert!(store.initialized());
        assert_eq!(store.status_text(), "未运行");
        assert_eq!(store.error(), "connection refused");
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_initialize_twice_fetches_twice() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(Command::GetServiceInfo, Ok(json!({"status": "stopped"})));
        bridge.respond(Command::GetServiceInfo, Ok(json!({"status": "running"})));
        let store = store_with(&bridge);

        store.initialize().await;
        assert!(store.initialized());
        assert!(!store.is_running());

        store.initialize().await;
        assert!(store.initialized());
        assert!(store.is_running());
        assert_eq!(bridge.count(Command::GetServiceInfo), 2);
    }

    #[tokio::test]
    async fn test_reset_state_restores_initial_snapshot() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(
            Command::GetServiceInfo,
            Ok(json!({"status": "running", "version": "1.24.0", "total_connections": 99})),
        );
        let store = store_with(&bridge);
        store.initialize().await;
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        store.reset_state();

        assert_eq!(store.snapshot(), ViewState::initial(Locale::Zh));
        assert_eq!(bridge.calls().len(), 1);
        // A single notification, no loading toggle
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().loading);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_fetch() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(Command::GetServiceInfo, Ok(json!({"status": "running"})));
        let gate = bridge.hold();
        let store = Arc::new(store_with(&bridge));

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch_status().await }
        });
        store.subscribe().wait_for(|s| s.loading).await.unwrap();

        store.reset_state();
        assert!(store.loading());
        gate.notify_one();
        let outcome = task.await.unwrap();

        assert!(outcome.success);
        assert!(!store.is_running());
        assert_eq!(store.snapshot(), ViewState::initial(Locale::Zh));
    }

    #[tokio::test]
    async fn test_reset_during_initialize_leaves_store_uninitialized() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(
            Command::GetServiceInfo,
            Ok(json!({"status": "running", "version": "1.24.0"})),
        );
        let gate = bridge.hold();
        let store = Arc::new(store_with(&bridge));

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.initialize().await }
        });
        store.subscribe().wait_for(|s| s.loading).await.unwrap();

        store.reset_state();
        gate.notify_one();
        task.await.unwrap();

        assert!(!store.initialized());
        assert!(!store.loading());
        assert_eq!(store.snapshot(), ViewState::initial(Locale::Zh));
    }

    #[tokio::test]
    async fn test_initialize_after_reset_marks_initialized() {
        let bridge = Arc::new(ScriptedBridge::new());
        bridge.respond(Command::GetServiceInfo, Ok(json!({"status": "stopped"})));
        let store = store_with(&bridge);

        store.reset_state();
        store.initialize().await;

        assert!(store.initialized());
        assert_eq!(store.status_text(), "未运行");
    }
}
