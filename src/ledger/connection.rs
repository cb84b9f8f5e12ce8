//! The connection boundary
//!
//! The ledger only needs two things from a client connection: a stable
//! identity for de-duplication and a way to close it. Closing is async so a
//! transport can run its own close handshake; the ledger bounds it with a
//! timeout.

use std::fmt;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::utils::CloseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn close(&self) -> BoxFuture<'_, Result<(), CloseError>>;

    /// Tell the peer which virtual host the connection was bound to.
    /// Transports without such a notification keep the default no-op.
    fn notify_bound(&self, _virtual_host: &str) -> Result<(), CloseError> {
        Ok(())
    }
}
