//! Virtual host registry
//!
//! The registry is the authoritative index from host names to virtual hosts.
//! It owns every registered virtual host by id and keeps one index entry per
//! alias.
//!
//! Concurrency and usage notes:
//! - All state lives behind a single `RwLock`. `resolve` takes the read lock,
//!   `register`/`unregister` take the write lock. Every mutation is validated
//!   before the index is touched, so readers observe either the state before
//!   a mutation or the state after it.
//! - Nothing here performs I/O or calls into connections while the lock is
//!   held.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::{HostNameKey, VirtualHost};
use crate::utils::{BrokerError, Result};

#[derive(Debug, Default)]
struct RegistryIndex {
    by_host: HashMap<HostNameKey, Arc<VirtualHost>>,
    by_id: HashMap<String, Arc<VirtualHost>>,
    default_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct VirtualHostRegistry {
    index: RwLock<RegistryIndex>,
}

impl VirtualHostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a virtual host under all of its aliases.
    ///
    /// Fails without touching the index if the id is already registered or if
    /// any alias is claimed by another virtual host.
    pub fn register(&self, vh: VirtualHost) -> Result<Arc<VirtualHost>> {
        let mut index = self.write();

        if index.by_id.contains_key(vh.id()) {
            return Err(BrokerError::DuplicateVirtualHostId(vh.id().to_string()));
        }

        for alias in vh.aliases() {
            if let Some(existing) = index.by_host.get(alias) {
                warn!(
                    "Rejected virtual host {}: host name {} belongs to {}",
                    vh.id(),
                    alias,
                    existing.id()
                );
                return Err(BrokerError::DuplicateHostName {
                    key: alias.clone(),
                    existing: existing.id().to_string(),
                });
            }
        }

        let vh = Arc::new(vh);
        for alias in vh.aliases() {
            index.by_host.insert(alias.clone(), Arc::clone(&vh));
        }
        index.by_id.insert(vh.id().to_string(), Arc::clone(&vh));

        info!(
            "Registered virtual host {} with {} host name(s)",
            vh.id(),
            vh.aliases().len()
        );
        Ok(vh)
    }

    /// Remove a stopped (or never started) virtual host and all its aliases.
    pub fn unregister(&self, id: &str) -> Result<Arc<VirtualHost>> {
        let mut index = self.write();

        let vh = match index.by_id.get(id) {
            Some(vh) => Arc::clone(vh),
            None => return Err(BrokerError::NotFound(id.to_string())),
        };
        vh.mark_unregistered()?;

        index.by_id.remove(id);
        for alias in vh.aliases() {
            index.by_host.remove(alias);
        }
        if index.default_id.as_deref() == Some(id) {
            index.default_id = None;
        }

        info!("Unregistered virtual host {}", id);
        Ok(vh)
    }

    /// Resolve a requested host name. An empty name resolves to the default
    /// virtual host when one is configured.
    pub fn resolve(&self, requested_name: &str) -> Result<Arc<VirtualHost>> {
        let index = self.read();

        let found = match HostNameKey::parse(requested_name) {
            Some(key) => index.by_host.get(&key),
            None => index
                .default_id
                .as_ref()
                .and_then(|id| index.by_id.get(id)),
        };

        match found {
            Some(vh) => {
                debug!("Resolved '{}' to virtual host {}", requested_name, vh.id());
                Ok(Arc::clone(vh))
            }
            None => Err(BrokerError::NotFound(requested_name.trim().to_string())),
        }
    }

    /// Make `id` the target for connections that do not name a host.
    pub fn set_default(&self, id: &str) -> Result<()> {
        let mut index = self.write();
        if !index.by_id.contains_key(id) {
            return Err(BrokerError::NotFound(id.to_string()));
        }
        index.default_id = Some(id.to_string());
        Ok(())
    }

    pub fn default_host(&self) -> Option<Arc<VirtualHost>> {
        let index = self.read();
        index
            .default_id
            .as_ref()
            .and_then(|id| index.by_id.get(id))
            .cloned()
    }

    pub fn get(&self, id: &str) -> Option<Arc<VirtualHost>> {
        self.read().by_id.get(id).cloned()
    }

    /// All registered virtual hosts, ordered by id.
    pub fn virtual_hosts(&self) -> Vec<Arc<VirtualHost>> {
        let mut hosts: Vec<Arc<VirtualHost>> = self.read().by_id.values().cloned().collect();
        hosts.sort_by(|a, b| a.id().cmp(b.id()));
        hosts
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Mutations are validated before they write, so the index is consistent
    // even if a holder panicked.
    fn read(&self) -> RwLockReadGuard<'_, RegistryIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }
}
