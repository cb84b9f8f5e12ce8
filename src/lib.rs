//! # vhost-broker
//!
//! `vhost-broker` is the virtual-host identity and routing layer of a
//! multi-tenant message broker. It maps the host names clients ask for onto
//! broker partitions (virtual hosts) and keeps track of live client
//! connections so they can be torn down deterministically.
//!
//! ## Core Modules
//!
//! - `vhost`: host-name keys, virtual hosts and the registry that resolves them.
//! - `destination`: destination kinds and collision-free destination naming.
//! - `ledger`: the connection boundary and the ledger that closes every tracked
//!   connection at teardown.
//! - `client`: an in-process, channel-backed client connection.
//! - `broker`: the engine wiring configuration, connections and destinations.
//! - `config`: loading and validating settings and virtual host records.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod destination;
pub mod ledger;
pub mod utils;
pub mod vhost;

pub use broker::Broker;
pub use utils::{BrokerError, CloseError, Result};
