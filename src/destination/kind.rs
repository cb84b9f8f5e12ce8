use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::utils::BrokerError;

/// The kind of a destination. Temporary kinds never take a caller-supplied
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationKind {
    Queue,
    Topic,
    TemporaryQueue,
    TemporaryTopic,
}

impl DestinationKind {
    pub fn is_temporary(self) -> bool {
        matches!(
            self,
            DestinationKind::TemporaryQueue | DestinationKind::TemporaryTopic
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DestinationKind::Queue => "queue",
            DestinationKind::Topic => "topic",
            DestinationKind::TemporaryQueue => "temp-queue",
            DestinationKind::TemporaryTopic => "temp-topic",
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DestinationKind {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" => Ok(DestinationKind::Queue),
            "topic" => Ok(DestinationKind::Topic),
            "temp-queue" | "temporary-queue" => Ok(DestinationKind::TemporaryQueue),
            "temp-topic" | "temporary-topic" => Ok(DestinationKind::TemporaryTopic),
            _ => Err(BrokerError::UnsupportedDestinationKind(s.to_string())),
        }
    }
}

/// Metadata kept in a virtual host's namespace for each destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationInfo {
    pub kind: DestinationKind,
    /// Milliseconds since UNIX epoch.
    pub created_at: i64,
}

/// What callers get back from `create_destination`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DestinationHandle {
    pub virtual_host: String,
    pub name: String,
    pub kind: DestinationKind,
}
