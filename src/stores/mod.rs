/**
 * ============================================================================
 * STORES MODULE
 * ============================================================================
 * 
 * PURPOSE: View-state containers the UI binds to
 * 
 * SUBMODULES:
 * - service: Raw service snapshot plus per-type log records
 * - status: Derived, display-ready status with init/reset lifecycle
 * - messages: Locale, status labels and per-operation fallback messages
 * - poller: Periodic status refresh for the derived store
 * - tracking: In-flight counting and stale-result detection
 * 
 * Both stores publish state through `tokio::sync::watch`; views subscribe
 * and re-render on change. Neither store retries, caches or cancels.
 * 
 * ============================================================================
 */

pub mod messages;
pub mod poller;
pub mod service;
pub mod status;
mod tracking;

pub use messages::{Locale, Operation, StatusLabels};
pub use poller::StatusPoller;
pub use service::{ServiceSnapshot, ServiceStatusStore};
pub use status::{DerivedStatusStore, OpOutcome, StatusView, ViewState};
