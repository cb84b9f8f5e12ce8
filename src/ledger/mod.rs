//! The `ledger` module tracks live client connections so they can be torn
//! down deterministically.
//!
//! - `connection`: the `Connection` trait and connection identity.
//! - `tracker`: `ConnectionLedger` and the `CloseReport` produced at teardown.

pub mod connection;
pub mod tracker;

pub use connection::{Connection, ConnectionId};
pub use tracker::{CloseReport, ConnectionLedger};
