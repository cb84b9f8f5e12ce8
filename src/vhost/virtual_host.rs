//! Virtual hosts
//!
//! A `VirtualHost` is a named partition of the broker. It owns a fixed set of
//! host-name aliases, a lifecycle state and a private destination namespace.
//!
//! Concurrency note: a registered virtual host is shared behind an `Arc`, so
//! its mutable parts (state and namespace) sit behind their own short-lived
//! locks. No lock is held across calls into other components.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::HostNameKey;
use crate::destination::{
    DestinationHandle, DestinationInfo, DestinationKind, DestinationNamer, NamingContext,
};
use crate::utils::{BrokerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Created,
    Started,
    Stopped,
    Unregistered,
}

/// Serializable snapshot of a virtual host, used for status output.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualHostSummary {
    pub id: String,
    pub aliases: Vec<HostNameKey>,
    pub state: LifecycleState,
    pub destinations: usize,
}

#[derive(Debug)]
pub struct VirtualHost {
    id: String,
    aliases: BTreeSet<HostNameKey>,
    state: Mutex<LifecycleState>,
    namespace: Mutex<HashMap<String, DestinationInfo>>,
    namer: DestinationNamer,
    naming_context: NamingContext,
}

impl VirtualHost {
    /// Create a virtual host from raw host names. Names are canonicalized and
    /// de-duplicated; names that normalize to nothing are dropped. Fails when
    /// no alias survives.
    pub fn create<I, S>(id: &str, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.trim();
        if id.is_empty() {
            return Err(BrokerError::InvalidConfig(
                "virtual host id must not be empty".to_string(),
            ));
        }

        let aliases: BTreeSet<HostNameKey> = aliases
            .into_iter()
            .filter_map(|raw| HostNameKey::parse(raw.as_ref()))
            .collect();

        if aliases.is_empty() {
            return Err(BrokerError::InvalidConfig(format!(
                "virtual host '{id}' has no host names"
            )));
        }

        Ok(Self {
            id: id.to_string(),
            aliases,
            state: Mutex::new(LifecycleState::Created),
            namespace: Mutex::new(HashMap::new()),
            namer: DestinationNamer::new(),
            naming_context: NamingContext::new("vhost", id),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aliases(&self) -> &BTreeSet<HostNameKey> {
        &self.aliases
    }

    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    pub fn is_started(&self) -> bool {
        self.state() == LifecycleState::Started
    }

    /// Created or Stopped → Started. An unregistered host cannot be started.
    pub fn start(&self) -> Result<()> {
        let mut state = self.lock_state();
        match *state {
            LifecycleState::Started => {
                return Err(BrokerError::AlreadyStarted(self.id.clone()));
            }
            LifecycleState::Unregistered => {
                return Err(BrokerError::Unregistered(self.id.clone()));
            }
            LifecycleState::Created | LifecycleState::Stopped => {}
        }
        *state = LifecycleState::Started;
        info!("Virtual host {} started", self.id);
        Ok(())
    }

    /// Started → Stopped. Stopping a host that is not running is an error.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.lock_state();
        if *state != LifecycleState::Started {
            return Err(BrokerError::NotStarted(self.id.clone()));
        }
        *state = LifecycleState::Stopped;
        info!("Virtual host {} stopped", self.id);
        Ok(())
    }

    /// Move to the terminal `Unregistered` state. Checked and set under the
    /// state lock so a concurrent `start` either wins (and this fails) or is
    /// rejected afterwards.
    pub(crate) fn mark_unregistered(&self) -> Result<()> {
        let mut state = self.lock_state();
        if *state == LifecycleState::Started {
            return Err(BrokerError::StillStarted(self.id.clone()));
        }
        *state = LifecycleState::Unregistered;
        Ok(())
    }

    /// Create a destination in this host's namespace.
    ///
    /// Temporary kinds ignore `requested_name` and always get a fresh name.
    /// Durable kinds use `requested_name` when given and fail if it is taken;
    /// without one the next free generated name is used.
    pub fn create_destination(
        &self,
        kind: DestinationKind,
        requested_name: Option<&str>,
    ) -> Result<DestinationHandle> {
        let requested = requested_name
            .map(str::trim)
            .filter(|name| !name.is_empty() && !kind.is_temporary());

        let mut namespace = self.lock_namespace();
        let name = match requested {
            Some(name) => {
                if let Some(existing) = namespace.get(name) {
                    return Err(BrokerError::NameConflict {
                        name: name.to_string(),
                        kind: existing.kind,
                    });
                }
                name.to_string()
            }
            // skip generated names a caller already claimed explicitly
            None => loop {
                let candidate = self.namer.next(&self.naming_context, kind);
                if !namespace.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        namespace.insert(
            name.clone(),
            DestinationInfo {
                kind,
                created_at: Utc::now().timestamp_millis(),
            },
        );
        debug!("Created {} {} in virtual host {}", kind, name, self.id);

        Ok(DestinationHandle {
            virtual_host: self.id.clone(),
            name,
            kind,
        })
    }

    /// Remove a destination. Generated names are not recycled afterwards.
    pub fn remove_destination(&self, name: &str) -> Option<DestinationInfo> {
        self.lock_namespace().remove(name)
    }

    pub fn destination(&self, name: &str) -> Option<DestinationInfo> {
        self.lock_namespace().get(name).cloned()
    }

    /// Names of all destinations, sorted.
    pub fn destinations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock_namespace().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn summary(&self) -> VirtualHostSummary {
        VirtualHostSummary {
            id: self.id.clone(),
            aliases: self.aliases.iter().cloned().collect(),
            state: self.state(),
            destinations: self.lock_namespace().len(),
        }
    }

    // Neither lock guards a multi-step invariant, so a poisoned guard is still
    // consistent.
    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_namespace(&self) -> MutexGuard<'_, HashMap<String, DestinationInfo>> {
        self.namespace.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
