// Configuration structs

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::constants::*;

/// Discovery-and-liveness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// DNS-SD service type to browse (e.g. "_http._tcp.local.")
    pub service_type: String,
    /// Case-insensitive token the instance name must contain
    pub target_name: String,
    /// Discovery and watchdog tick in milliseconds
    pub interval_ms: u64,
    /// Resolve timeout in milliseconds
    pub resolve_timeout_ms: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            target_name: DEFAULT_TARGET_NAME.to_string(),
            interval_ms: DEFAULT_DISCOVERY_INTERVAL_MS,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
        }
    }
}

impl DiscoverySettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Time without a sighting after which a found service counts as lost.
    pub fn liveness_timeout(&self) -> Duration {
        self.interval() * LIVENESS_INTERVALS
    }
}

/// Score push client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_PUSH_TIMEOUT_SECS,
        }
    }
}

impl PushSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Game defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Event name sent with every snapshot
    pub event_name: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoverySettings,
    pub push: PushSettings,
    pub game: GameSettings,
}
