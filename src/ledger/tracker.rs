//! Connection ledger
//!
//! Tracks every live connection handed out during a unit of work and closes
//! all of them at teardown.
//!
//! Concurrency and usage notes:
//! - `track`/`untrack` take the ledger lock for a single insert or removal.
//! - `close_all` takes the lock once to mark the generation closed and take
//!   the tracked connections out, then releases it before awaiting any close.
//!   A `track` that wins the lock first is part of the snapshot; one that
//!   loses it is rejected with `LedgerClosed`. Nothing is dropped silently and
//!   nothing is closed twice.
//! - Each close runs under `close_timeout`. Errors, timeouts and panics are
//!   recorded in the `CloseReport` and never stop the remaining closes.

use std::collections::HashSet;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::{Connection, ConnectionId};
use crate::utils::{BrokerError, CloseError, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub closed: usize,
    pub failures: Vec<(ConnectionId, CloseError)>,
}

impl CloseReport {
    pub fn attempted(&self) -> usize {
        self.closed + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct LedgerState {
    order: Vec<Arc<dyn Connection>>,
    members: HashSet<ConnectionId>,
    closed: bool,
    generation: u64,
}

pub struct ConnectionLedger {
    state: Mutex<LedgerState>,
    close_timeout: Duration,
}

impl std::fmt::Debug for ConnectionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLedger")
            .field("close_timeout", &self.close_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ConnectionLedger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CLOSE_TIMEOUT)
    }
}

impl ConnectionLedger {
    pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(close_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            close_timeout,
        }
    }

    /// Start tracking `conn`. Tracking a connection that is already tracked is
    /// a no-op.
    pub fn track(&self, conn: Arc<dyn Connection>) -> Result<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(BrokerError::LedgerClosed);
        }
        let id = conn.id();
        if state.members.insert(id) {
            state.order.push(conn);
            debug!("Tracking connection {}", id);
        }
        Ok(())
    }

    /// Stop tracking a connection without closing it.
    pub fn untrack(&self, id: ConnectionId) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.members.remove(&id) {
            return Ok(false);
        }
        state.order.retain(|conn| conn.id() != id);
        Ok(true)
    }

    pub fn contains(&self, id: ConnectionId) -> Result<bool> {
        Ok(self.lock()?.members.contains(&id))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.order.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn is_closed(&self) -> Result<bool> {
        Ok(self.lock()?.closed)
    }

    pub fn generation(&self) -> Result<u64> {
        Ok(self.lock()?.generation)
    }

    /// Close every tracked connection once, in tracking order, and empty the
    /// ledger. Individual failures end up in the report.
    ///
    /// Only one `close_all` succeeds per generation; later calls fail with
    /// `LedgerAlreadyClosed` until `reopen`.
    pub async fn close_all(&self) -> Result<CloseReport> {
        let snapshot = {
            let mut state = self.lock()?;
            if state.closed {
                return Err(BrokerError::LedgerAlreadyClosed);
            }
            state.closed = true;
            state.members.clear();
            mem::take(&mut state.order)
        };

        info!("Closing {} tracked connection(s)", snapshot.len());

        let mut report = CloseReport::default();
        for conn in snapshot {
            let id = conn.id();
            match self.close_one(conn.as_ref()).await {
                Ok(()) => report.closed += 1,
                Err(e) => {
                    warn!("Failed to close connection {}: {}", id, e);
                    report.failures.push((id, e));
                }
            }
        }

        info!(
            "Closed {} connection(s), {} failure(s)",
            report.closed,
            report.failures.len()
        );
        Ok(report)
    }

    /// Open a new generation after `close_all` so tracking can resume.
    pub fn reopen(&self) -> Result<u64> {
        let mut state = self.lock()?;
        if state.closed {
            state.closed = false;
            state.generation += 1;
        }
        Ok(state.generation)
    }

    async fn close_one(&self, conn: &dyn Connection) -> std::result::Result<(), CloseError> {
        let close = match panic::catch_unwind(AssertUnwindSafe(|| conn.close())) {
            Ok(close) => AssertUnwindSafe(close).catch_unwind(),
            Err(_panic) => return Err(CloseError::Panicked),
        };
        match tokio::time::timeout(self.close_timeout, close).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(CloseError::Panicked),
            Err(_elapsed) => Err(CloseError::Timeout(self.close_timeout.as_millis() as u64)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| BrokerError::LedgerPoisoned)
    }
}
