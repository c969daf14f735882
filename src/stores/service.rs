/**
 * ============================================================================
 * SERVICE STATUS STORE
 * ============================================================================
 *
 * PURPOSE: Raw mirror of the backend's service snapshot plus per-log-type
 *          content and existence flags
 *
 * BEHAVIOR:
 * - Each operation marks the store loading, clears the error, awaits one
 *   bridge call and records the result or the failure message
 * - Failed reads keep the previous data; only `error` changes
 * - A late successful result older than one already applied is dropped; a
 *   late failure is still reported through `error`
 * - Control commands resync with a full fetch on success, never optimistically
 *
 * ============================================================================
 */

use crate::bridge::{commands, BridgeError, CommandBridge, LogFilter, LogQuery};
use crate::stores::messages::{failure_message, Locale, Operation};
use crate::stores::status::StatusView;
use crate::stores::tracking::{Freshness, HasLoading, InFlight, LoadingGuard};
use crate::types::{LogBook, LogRecord, LogType, ServiceInfo, ServiceStatus};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    pub service_info: ServiceInfo,
    pub logs: LogBook,
    pub loading: bool,
    pub error: Option<String>,
}

impl HasLoading for ServiceSnapshot {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

pub struct ServiceStatusStore {
    bridge: Arc<dyn CommandBridge>,
    locale: Locale,
    state: watch::Sender<ServiceSnapshot>,
    in_flight: InFlight,
    info_freshness: Freshness,
    content_freshness: [Freshness; 3],
    exists_freshness: [Freshness; 3],
}

impl ServiceStatusStore {
    pub fn new(bridge: Arc<dyn CommandBridge>, locale: Locale) -> Self {
        let (state, _) = watch::channel(ServiceSnapshot::default());
        Self {
            bridge,
            locale,
            state,
            in_flight: InFlight::default(),
            info_freshness: Freshness::default(),
            content_freshness: Default::default(),
            exists_freshness: Default::default(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn subscribe(&self) -> watch::Receiver<ServiceSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        self.state.borrow().clone()
    }

    pub fn service_info(&self) -> ServiceInfo {
        self.state.borrow().service_info.clone()
    }

    pub fn log(&self, log_type: LogType) -> LogRecord {
        self.state.borrow().logs.get(log_type).clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().service_info.status == ServiceStatus::Running
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().service_info.status == ServiceStatus::Stopped
    }

    pub fn is_checking(&self) -> bool {
        self.state.borrow().service_info.status == ServiceStatus::Checking
    }

    /// Display fields derived from the current raw snapshot
    pub fn status_view(&self) -> StatusView {
        StatusView::derive(&self.state.borrow().service_info, self.locale)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /**
     * Replace the service snapshot with the backend's current one
     * On failure the previous snapshot stays and `error` is set
     */
    pub async fn fetch_service_info(&self) {
        let _loading = self.begin();
        let ticket = self.info_freshness.ticket();
        match commands::get_service_info(self.bridge.as_ref()).await {
            Ok(info) if self.info_freshness.accept(ticket) => {
                self.state.send_modify(|s| s.service_info = info)
            }
            Ok(_) => log::debug!("Discarding stale service info (request #{})", ticket),
            Err(e) => self.record_failure(Operation::FetchServiceInfo, &e),
        }
    }

    pub async fn start_service(&self) {
        self.control(
            Operation::StartService,
            commands::start_nginx(self.bridge.as_ref()),
        )
        .await
    }

    pub async fn stop_service(&self) {
        self.control(
            Operation::StopService,
            commands::stop_nginx(self.bridge.as_ref()),
        )
        .await
    }

    pub async fn restart_service(&self) {
        self.control(
            Operation::RestartService,
            commands::restart_nginx(self.bridge.as_ref()),
        )
        .await
    }

    /**
     * Load the tail of one log, filtered by the backend
     * Stores the text verbatim; `exists` is left alone
     */
    pub async fn fetch_logs(&self, log_type: LogType, filter: &LogFilter) {
        let _loading = self.begin();
        let freshness = &self.content_freshness[log_type.index()];
        let ticket = freshness.ticket();
        let query = LogQuery::new(log_type, filter);
        match commands::get_nginx_logs(self.bridge.as_ref(), &query).await {
            Ok(content) if freshness.accept(ticket) => self
                .state
                .send_modify(|s| s.logs.get_mut(log_type).content = content),
            Ok(_) => log::debug!("Discarding stale {} log content (request #{})", log_type, ticket),
            Err(e) => self.record_failure(Operation::FetchLogs, &e),
        }
    }

    /**
     * Truncate one log on the backend and empty the local copy
     * The backend is not re-read afterwards
     */
    pub async fn clear_logs(&self, log_type: LogType) {
        let _loading = self.begin();
        let freshness = &self.content_freshness[log_type.index()];
        let ticket = freshness.ticket();
        let result = commands::clear_logs(self.bridge.as_ref(), log_type).await;

        match result {
            Ok(()) => {
                if freshness.accept(ticket) {
                    self.state
                        .send_modify(|s| s.logs.get_mut(log_type).content.clear());
                } else {
                    log::debug!("Newer {} log content already applied, keeping it", log_type);
                }
            }
            Err(e) => self.record_failure(Operation::ClearLogs, &e),
        }
    }

    /// Refresh only the `exists` flag of one log record
    pub async fn check_log_exists(&self, log_type: LogType) {
        let _loading = self.begin();
        let freshness = &self.exists_freshness[log_type.index()];
        let ticket = freshness.ticket();
        match commands::check_log_exists(self.bridge.as_ref(), log_type).await {
            Ok(exists) if freshness.accept(ticket) => self
                .state
                .send_modify(|s| s.logs.get_mut(log_type).exists = exists),
            Ok(_) => log::debug!("Discarding stale {} log existence (request #{})", log_type, ticket),
            Err(e) => self.record_failure(Operation::CheckLogExists, &e),
        }
    }

    pub async fn open_log_folder(&self) {
        let _loading = self.begin();
        if let Err(e) = commands::open_log_folder(self.bridge.as_ref()).await {
            self.record_failure(Operation::OpenLogFolder, &e);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin(&self) -> LoadingGuard<'_, ServiceSnapshot> {
        let guard = self.in_flight.enter(&self.state);
        self.state.send_modify(|s| s.error = None);
        guard
    }

    async fn control(
        &self,
        operation: Operation,
        request: impl Future<Output = Result<(), BridgeError>>,
    ) {
        let _loading = self.begin();
        match request.await {
            Ok(()) => self.fetch_service_info().await,
            Err(e) => self.record_failure(operation, &e),
        }
    }

    fn record_failure(&self, operation: Operation, err: &BridgeError) {
        log::error!("{}: {}", operation, err);
        let message = failure_message(operation, self.locale, err);
        self.state.send_modify(|s| s.error = Some(message));
    }
}
