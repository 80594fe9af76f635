//! Per-call state shared by the outbound and inbound phases.

use crate::transactions::TransactionLog;
use crate::types::{TimeoutOverrides, TransactionState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error recorded when a call is dropped before reaching an outcome.
pub const CANCELLED_ERROR: &str = "request cancelled";

/// Context created by the outbound phase and carried in the request and
/// response extensions of one call.
///
/// Clones share the same pending-call guard: once the last clone is dropped
/// without the call having been settled, the transaction is marked failed.
#[derive(Debug, Clone)]
pub struct CallContext {
    transaction_id: String,
    started_at: i64,
    started: Instant,
    timeouts: TimeoutOverrides,
    mocked_by: Option<String>,
    guard: Arc<PendingCall>,
}

impl CallContext {
    pub(crate) fn new(
        transaction_id: String,
        started_at: i64,
        timeouts: TimeoutOverrides,
        log: Arc<TransactionLog>,
    ) -> Self {
        let guard = Arc::new(PendingCall {
            transaction_id: transaction_id.clone(),
            log,
            settled: AtomicBool::new(false),
        });
        Self {
            transaction_id,
            started_at,
            started: Instant::now(),
            timeouts,
            mocked_by: None,
            guard,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Epoch milliseconds when the outbound phase began.
    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Timeout overrides in effect when the call started.
    pub fn timeouts(&self) -> TimeoutOverrides {
        self.timeouts
    }

    /// Id of the response mock that answered this call, if any.
    pub fn mocked_by(&self) -> Option<&str> {
        self.mocked_by.as_deref()
    }

    pub(crate) fn set_mocked_by(&mut self, mock_id: &str) {
        self.mocked_by = Some(mock_id.to_owned());
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Mark the call as having reached a terminal state.
    pub(crate) fn settle(&self) {
        self.guard.settled.store(true, Ordering::Release);
    }

    pub fn is_settled(&self) -> bool {
        self.guard.settled.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct PendingCall {
    transaction_id: String,
    log: Arc<TransactionLog>,
    settled: AtomicBool,
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if self.settled.load(Ordering::Acquire) {
            return;
        }
        tracing::debug!(transaction_id = %self.transaction_id, "call dropped before completion");
        self.log.update(&self.transaction_id, |t| {
            if t.is_in_flight() {
                t.failed(CANCELLED_ERROR, TransactionState::Failed)
            } else {
                t
            }
        });
    }
}
