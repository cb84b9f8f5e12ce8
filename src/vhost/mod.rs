//! The `vhost` module maps externally visible host names onto the broker's
//! virtual hosts.
//!
//! - `host_name`: canonical, comparable host-name keys.
//! - `virtual_host`: a broker partition with aliases, lifecycle and namespace.
//! - `registry`: the host-name index with atomic register/unregister and
//!   lock-bounded resolution.

pub mod host_name;
pub mod registry;
pub mod virtual_host;

pub use host_name::HostNameKey;
pub use registry::VirtualHostRegistry;
pub use virtual_host::{LifecycleState, VirtualHost, VirtualHostSummary};
