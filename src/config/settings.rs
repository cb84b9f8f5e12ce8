use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes logging, broker-wide settings and the ordered list of virtual
/// hosts to register at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log: LogSettings,
    pub broker: BrokerSettings,
    pub virtual_hosts: Vec<VirtualHostRecord>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
}

/// Configuration settings for the broker.
///
/// `close_timeout_ms` bounds each connection close during teardown.
/// `default_virtual_host` receives connections that do not name a host.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    pub close_timeout_ms: u64,
    pub default_virtual_host: Option<String>,
}

/// One configured virtual host, as handed over by the config loader.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct VirtualHostRecord {
    pub id: String,
    #[serde(default)]
    pub host_names: Vec<String>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub log: Option<PartialLogSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub virtual_hosts: Option<Vec<VirtualHostRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub close_timeout_ms: Option<u64>,
    pub default_virtual_host: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogSettings {
                level: "info".to_string(),
            },
            broker: BrokerSettings {
                close_timeout_ms: 5000,
                default_virtual_host: None,
            },
            virtual_hosts: Vec::new(),
        }
    }
}
