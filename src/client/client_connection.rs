use futures::future::{self, BoxFuture};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::ledger::{Connection, ConnectionId};
use crate::utils::CloseError;

/// Notifications delivered to the peer side of a `ClientConnection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Bound { virtual_host: String },
    Closed,
}

/// Represents a connected client.
///
/// Each client is uniquely identified by an `id` and has a channel (`sender`)
/// for delivering events to the peer.
#[derive(Debug)]
pub struct ClientConnection {
    /// Unique identifier for the client.
    pub id: ConnectionId,

    /// Channel to send events to the peer.
    pub sender: UnboundedSender<ConnectionEvent>,
}

impl ClientConnection {
    pub fn new(sender: UnboundedSender<ConnectionEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a connection together with the receiver its peer reads from.
    pub fn pair() -> (Self, UnboundedReceiver<ConnectionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: ConnectionEvent) -> Result<(), CloseError> {
        self.sender
            .send(event)
            .map_err(|_| CloseError::Failed(format!("peer of {} is gone", self.id)))
    }
}

impl Connection for ClientConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn close(&self) -> BoxFuture<'_, Result<(), CloseError>> {
        Box::pin(future::ready(self.send(ConnectionEvent::Closed)))
    }

    fn notify_bound(&self, virtual_host: &str) -> Result<(), CloseError> {
        self.send(ConnectionEvent::Bound {
            virtual_host: virtual_host.to_string(),
        })
    }
}
