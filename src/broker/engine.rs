//! Broker engine
//!
//! The broker ties the virtual host registry to the connection ledger and
//! exposes the three boundaries the outside world talks to:
//! - configuration: `register_all` consumes validated `VirtualHostRecord`s
//! - connections: `on_connection_attempt` / `accept` resolve a requested host
//!   name and track the accepted connection
//! - destinations: `create_destination` inside a resolved virtual host
//!
//! Each `Broker` owns its own registry and ledger, so several brokers can live
//! in one process without sharing state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{BrokerSettings, VirtualHostRecord};
use crate::destination::{DestinationHandle, DestinationKind};
use crate::ledger::{CloseReport, Connection, ConnectionLedger};
use crate::utils::{BrokerError, Result};
use crate::vhost::{VirtualHost, VirtualHostRegistry, VirtualHostSummary};

#[derive(Debug, Default)]
pub struct Broker {
    registry: VirtualHostRegistry,
    ledger: ConnectionLedger,
    default_virtual_host: Option<String>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &BrokerSettings) -> Self {
        Self {
            registry: VirtualHostRegistry::new(),
            ledger: ConnectionLedger::new(Duration::from_millis(settings.close_timeout_ms)),
            default_virtual_host: settings.default_virtual_host.clone(),
        }
    }

    pub fn registry(&self) -> &VirtualHostRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &ConnectionLedger {
        &self.ledger
    }

    /// Register configured virtual hosts in order. Stops at the first record
    /// that fails validation or registration; hosts registered before it stay
    /// registered.
    pub fn register_all(&self, records: &[VirtualHostRecord]) -> Result<Vec<Arc<VirtualHost>>> {
        let mut registered = Vec::with_capacity(records.len());
        for record in records {
            record.validate()?;
            let vh = VirtualHost::create(&record.id, &record.host_names)?;
            registered.push(self.registry.register(vh)?);
        }

        if let Some(default) = &self.default_virtual_host {
            match self.registry.set_default(default) {
                Ok(()) => debug!("Default virtual host is {}", default),
                Err(_) => warn!("Default virtual host {} is not registered", default),
            }
        }

        info!("Registered {} virtual host(s)", registered.len());
        Ok(registered)
    }

    /// Resolve the host a connecting client asked for. A `NotFound` error
    /// means the connection must be refused.
    pub fn on_connection_attempt(&self, requested_host_name: &str) -> Result<Arc<VirtualHost>> {
        self.registry.resolve(requested_host_name).inspect_err(|e| {
            warn!("Refusing connection for '{}': {}", requested_host_name, e);
        })
    }

    /// Resolve, track and notify a client connection.
    ///
    /// The connection is only tracked once resolution succeeds. A failed
    /// bound notification is logged; the connection stays tracked so teardown
    /// still closes it.
    pub fn accept(
        &self,
        requested_host_name: &str,
        conn: Arc<dyn Connection>,
    ) -> Result<Arc<VirtualHost>> {
        let vh = self.on_connection_attempt(requested_host_name)?;
        self.ledger.track(Arc::clone(&conn))?;
        if let Err(e) = conn.notify_bound(vh.id()) {
            warn!("Failed to notify {} of binding: {}", conn.id(), e);
        }
        debug!("Connection {} bound to virtual host {}", conn.id(), vh.id());
        Ok(vh)
    }

    pub fn create_destination(
        &self,
        vh: &VirtualHost,
        kind: DestinationKind,
        name: Option<&str>,
    ) -> Result<DestinationHandle> {
        vh.create_destination(kind, name)
    }

    pub fn start_all(&self) -> Result<()> {
        for vh in self.registry.virtual_hosts() {
            if !vh.is_started() {
                vh.start()?;
            }
        }
        Ok(())
    }

    /// Stop every started virtual host. Hosts that are not running are
    /// skipped.
    pub fn stop_all(&self) {
        for vh in self.registry.virtual_hosts() {
            if vh.is_started() {
                if let Err(e) = vh.stop() {
                    warn!("Failed to stop virtual host {}: {}", vh.id(), e);
                }
            }
        }
    }

    /// Stop and unregister a virtual host by id.
    pub fn remove_virtual_host(&self, id: &str) -> Result<Arc<VirtualHost>> {
        let vh = self
            .registry
            .get(id)
            .ok_or_else(|| BrokerError::NotFound(id.to_string()))?;
        if vh.is_started() {
            vh.stop()?;
        }
        self.registry.unregister(id)
    }

    pub fn summary(&self) -> Vec<VirtualHostSummary> {
        self.registry
            .virtual_hosts()
            .iter()
            .map(|vh| vh.summary())
            .collect()
    }

    /// Close every tracked connection, then stop the virtual hosts.
    pub async fn shutdown(&self) -> Result<CloseReport> {
        let report = self.ledger.close_all().await?;
        self.stop_all();
        info!(
            "Broker shut down: {} closed, {} failed",
            report.closed,
            report.failures.len()
        );
        Ok(report)
    }
}
