//! The `error` module defines the error types used across the broker.
//!
//! `BrokerError` covers every failure that is surfaced synchronously to a
//! caller: configuration, resolution, lifecycle and ledger misuse.
//! `CloseError` describes a single failed connection close. Close failures are
//! collected into a `CloseReport` by the ledger and never returned as an `Err`.

use thiserror::Error;

use crate::destination::DestinationKind;
use crate::vhost::HostNameKey;

pub type Result<T> = std::result::Result<T, BrokerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("invalid virtual host configuration: {0}")]
    InvalidConfig(String),

    #[error("host name '{key}' is already claimed by virtual host '{existing}'")]
    DuplicateHostName { key: HostNameKey, existing: String },

    #[error("virtual host '{0}' is already registered")]
    DuplicateVirtualHostId(String),

    #[error("no virtual host found for '{0}'")]
    NotFound(String),

    #[error("virtual host '{0}' is already started")]
    AlreadyStarted(String),

    #[error("virtual host '{0}' is not started")]
    NotStarted(String),

    #[error("virtual host '{0}' must be stopped before it is unregistered")]
    StillStarted(String),

    #[error("virtual host '{0}' has been unregistered")]
    Unregistered(String),

    #[error("destination '{name}' already exists as a {kind}")]
    NameConflict { name: String, kind: DestinationKind },

    #[error("unsupported destination kind: {0}")]
    UnsupportedDestinationKind(String),

    #[error("connection ledger is closed")]
    LedgerClosed,

    #[error("connection ledger was already closed in this generation")]
    LedgerAlreadyClosed,

    #[error("connection ledger lock poisoned")]
    LedgerPoisoned,
}

impl BrokerError {
    /// True when the error should be reported to a connecting peer as a
    /// refused connection rather than an internal failure.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, BrokerError::NotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseError {
    #[error("close failed: {0}")]
    Failed(String),

    #[error("close timed out after {0} ms")]
    Timeout(u64),

    #[error("close panicked")]
    Panicked,
}
