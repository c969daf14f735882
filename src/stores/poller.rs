/**
 * ============================================================================
 * STATUS POLLER
 * ============================================================================
 *
 * PURPOSE: Keep the derived status view fresh while a view is showing it
 *
 * LIFECYCLE:
 * - spawn(): starts a tokio task calling fetch_status() once per interval
 * - stop(): signals shutdown and waits for the task to exit
 *
 * The interval is re-read from the cached panel config on every tick so a
 * config hot-update takes effect without restarting the poller.
 *
 * ============================================================================
 */

use crate::config;
use crate::stores::status::DerivedStatusStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct StatusPoller {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    pub fn spawn(store: Arc<DerivedStatusStore>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_loop(store, interval, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            log::warn!("Status poller task ended abnormally: {}", e);
        }
    }
}

fn current_interval(fallback: Duration) -> Duration {
    config::get_cached_config()
        .map(|c| Duration::from_secs(c.poll_interval_seconds))
        .unwrap_or(fallback)
}

async fn poll_loop(
    store: Arc<DerivedStatusStore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    log::info!("Status poller started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(current_interval(interval)) => {
                let outcome = store.fetch_status().await;
                if !outcome.success {
                    log::warn!(
                        "Status poll failed: {}",
                        outcome.message.unwrap_or_default()
                    );
                }
            }
        }
    }

    log::info!("Status poller stopped");
}
