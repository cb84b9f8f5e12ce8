//! Configuration loading
//!
//! Settings come from an optional `config/default` file and from environment
//! variables prefixed with `VHOST` (nested keys separated by `__`, e.g.
//! `VHOST__BROKER__CLOSE_TIMEOUT_MS`). Whatever is missing is filled from
//! `Settings::default()`.
//!
//! Loading only deserializes. Checking the virtual host records is a separate,
//! explicit step (`Settings::validate`), run again by the broker before it
//! registers anything.

mod settings;

use std::collections::HashSet;

use config::{Config, ConfigError, Environment, File};

use crate::utils::{BrokerError, Result};
use crate::vhost::HostNameKey;
use settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, Settings, VirtualHostRecord};

pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> std::result::Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Loads the configuration from `path` (optional) and environment variables,
/// merged over the defaults.
pub fn load_config_from(path: &str) -> std::result::Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("VHOST")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
        broker: BrokerSettings {
            close_timeout_ms: partial
                .broker
                .as_ref()
                .and_then(|b| b.close_timeout_ms)
                .unwrap_or(default.broker.close_timeout_ms),
            default_virtual_host: partial
                .broker
                .as_ref()
                .and_then(|b| b.default_virtual_host.clone())
                .or(default.broker.default_virtual_host),
        },
        virtual_hosts: partial.virtual_hosts.unwrap_or(default.virtual_hosts),
    })
}

impl VirtualHostRecord {
    pub fn new<I, S>(id: &str, host_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            host_names: host_names.into_iter().map(Into::into).collect(),
        }
    }

    /// A record needs an id and at least one host name; every listed host
    /// name must survive normalization.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BrokerError::InvalidConfig(
                "virtual host id must not be empty".to_string(),
            ));
        }
        if self.host_names.is_empty() {
            return Err(BrokerError::InvalidConfig(format!(
                "virtual host '{}' has no host names",
                self.id
            )));
        }
        if let Some(bad) = self
            .host_names
            .iter()
            .find(|name| HostNameKey::parse(name).is_none())
        {
            return Err(BrokerError::InvalidConfig(format!(
                "virtual host '{}' has an invalid host name '{}'",
                self.id, bad
            )));
        }
        Ok(())
    }
}

impl Settings {
    /// Validate every record and reject repeated ids. Host-name overlaps
    /// between records are left to registration.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for record in &self.virtual_hosts {
            record.validate()?;
            if !ids.insert(record.id.trim()) {
                return Err(BrokerError::InvalidConfig(format!(
                    "virtual host '{}' is configured more than once",
                    record.id
                )));
            }
        }
        if let Some(default) = &self.broker.default_virtual_host {
            if !ids.contains(default.trim()) {
                return Err(BrokerError::InvalidConfig(format!(
                    "default virtual host '{default}' is not configured"
                )));
            }
        }
        Ok(())
    }
}
