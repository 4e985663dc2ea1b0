// Discovery primitive capability
//
// The monitor never talks to a network stack directly. It drives a
// `ServiceBrowser`, which the platform (or the mdns-sd adapter in
// `service::discovery`) provides.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

use super::error::Result;

/// Concrete address of a resolved display server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub host: String,
    pub port: u16,
}

impl ServiceAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL for plain HTTP requests. IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Sighting reported by an active browse, keyed by instance name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEvent {
    Found(String),
    Lost(String),
}

impl BrowseEvent {
    pub fn service_name(&self) -> &str {
        match self {
            BrowseEvent::Found(name) | BrowseEvent::Lost(name) => name,
        }
    }
}

/// Channel an active browse delivers its sightings into.
pub type BrowseEvents = UnboundedSender<BrowseEvent>;

/// Platform capability for DNS-SD browsing and resolution.
#[async_trait]
pub trait ServiceBrowser: Send + Sync {
    /// Start browsing `service_type`; sightings are sent into `events`
    /// until `stop_browse` is called.
    async fn browse(&self, service_type: &str, events: BrowseEvents) -> Result<()>;

    /// Stop the browse started for `service_type`.
    async fn stop_browse(&self, service_type: &str) -> Result<()>;

    /// Turn an instance name into a host and port.
    ///
    /// May wait indefinitely; callers bound it with their own timeout.
    async fn resolve(&self, service_name: &str) -> Result<ServiceAddress>;
}

/// Whether an advertised instance name belongs to the display server.
pub fn matches_target(service_name: &str, target: &str) -> bool {
    service_name
        .to_lowercase()
        .contains(&target.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_target_case_insensitive() {
        assert!(matches_target("TFCStreamServer", "TFCStreamServer"));
        assert!(matches_target("tfcstreamserver-hall2", "TFCStreamServer"));
        assert!(matches_target("Hall 2 TFCSTREAMSERVER", "TFCStreamServer"));
        assert!(!matches_target("TFCStream", "TFCStreamServer"));
        assert!(!matches_target("printer", "TFCStreamServer"));
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            ServiceAddress::new("10.0.0.5", 8080).base_url(),
            "http://10.0.0.5:8080"
        );
        assert_eq!(
            ServiceAddress::new("fe80::1", 8080).base_url(),
            "http://[fe80::1]:8080"
        );
    }
}
