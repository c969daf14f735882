// In-flight accounting and stale-result detection shared by both stores.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;

pub(crate) trait HasLoading {
    fn set_loading(&mut self, loading: bool);
}

/**
 * Count of operations currently awaiting the backend
 *
 * The published `loading` flag is recomputed from the count inside the
 * watch lock, so overlapping operations keep it set until the last one ends.
 */
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    count: AtomicUsize,
}

impl InFlight {
    pub(crate) fn enter<'a, S: HasLoading>(&'a self, state: &'a watch::Sender<S>) -> LoadingGuard<'a, S> {
        state.send_modify(|s| {
            self.count.fetch_add(1, Ordering::SeqCst);
            s.set_loading(true);
        });
        LoadingGuard {
            in_flight: self,
            state,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.count.load(Ordering::SeqCst) > 0
    }
}

/// Releases its slot on drop, on every exit path
pub(crate) struct LoadingGuard<'a, S: HasLoading> {
    in_flight: &'a InFlight,
    state: &'a watch::Sender<S>,
}

impl<S: HasLoading> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let count = &self.in_flight.count;
        self.state.send_modify(|s| {
            let remaining = count.fetch_sub(1, Ordering::SeqCst) - 1;
            s.set_loading(remaining > 0);
        });
    }
}

/**
 * Generation tickets for one piece of state
 *
 * A result is applied only if no newer request's result has been applied
 * already; older results arriving late are dropped.
 */
#[derive(Debug, Default)]
pub(crate) struct Freshness {
    issued: AtomicU64,
    applied: AtomicU64,
    resets: AtomicU64,
}

impl Freshness {
    pub(crate) fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claims the slot for `ticket`; false if a newer result already landed
    pub(crate) fn accept(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }

    /// Makes every ticket issued so far stale
    pub(crate) fn invalidate(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.applied
            .fetch_max(self.issued.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// Number of invalidations so far; unchanged across a span means no reset
    pub(crate) fn epoch(&self) -> u64 {
        self.resets.load(Ordering::SeqCst)
    }
}
