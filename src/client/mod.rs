//! The `client` module defines the in-process representation of a connected
//! client.
//!
//! It provides `ClientConnection`, a `Connection` whose peer is the receiving
//! end of a channel. The broker notifies the peer when the connection is bound
//! to a virtual host and when it is closed.

pub mod client_connection;
pub use client_connection::{ClientConnection, ConnectionEvent};

#[cfg(test)]
mod tests;
