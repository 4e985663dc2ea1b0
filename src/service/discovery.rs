// mDNS/Bonjour service browsing
//
// ServiceBrowser backed by mdns-sd. mdns-sd resolves instances on its own
// while a browse is active, so `resolve` just waits for the resolved record
// of the requested instance to show up.

use async_trait::async_trait;
use mdns_sd::{ServiceDaemon, ServiceEvent};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::browser::{BrowseEvent, BrowseEvents, ServiceAddress, ServiceBrowser};
use super::error::{DiscoveryError, Result};

type Resolution = std::result::Result<ServiceAddress, String>;

/// Addresses of resolved instances, keyed by lowercase instance name.
///
/// A record that resolved without a usable address is kept as the reason, so
/// a waiting `resolve` fails instead of hanging until its timeout.
#[derive(Default)]
struct ResolvedCache {
    entries: Mutex<HashMap<String, Resolution>>,
    changed: Notify,
}

impl ResolvedCache {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Resolution>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, service_name: &str, resolution: Resolution) {
        self.entries().insert(service_name.to_lowercase(), resolution);
        self.changed.notify_waiters();
    }

    fn forget(&self, service_name: &str) {
        self.entries().remove(&service_name.to_lowercase());
    }

    /// Wait until `service_name` has been resolved.
    async fn wait_for(&self, service_name: &str) -> Result<ServiceAddress> {
        let key = service_name.to_lowercase();
        loop {
            // Created before the lookup so a record in between still wakes us.
            let changed = self.changed.notified();
            let entry = self.entries().get(&key).cloned();
            match entry {
                Some(Ok(address)) => return Ok(address),
                Some(Err(reason)) => {
                    return Err(DiscoveryError::Resolve {
                        service: service_name.to_string(),
                        reason,
                    })
                }
                None => changed.await,
            }
        }
    }
}

/// Browses the local network for DNS-SD advertisements.
pub struct MdnsBrowser {
    daemon: ServiceDaemon,
    resolved: Arc<ResolvedCache>,
}

impl MdnsBrowser {
    pub fn new() -> Result<Self> {
        let daemon = ServiceDaemon::new().map_err(|e| DiscoveryError::Daemon(e.to_string()))?;
        tracing::debug!("Created mDNS service daemon");

        Ok(Self {
            daemon,
            resolved: Arc::new(ResolvedCache::default()),
        })
    }

    /// Shut the daemon down. Browses end with it.
    pub fn shutdown(&self) -> Result<()> {
        self.daemon
            .shutdown()
            .map_err(|e| DiscoveryError::Daemon(e.to_string()))?;
        tracing::info!("Stopped mDNS service daemon");
        Ok(())
    }
}

#[async_trait]
impl ServiceBrowser for MdnsBrowser {
    async fn browse(&self, service_type: &str, events: BrowseEvents) -> Result<()> {
        let receiver = self
            .daemon
            .browse(service_type)
            .map_err(|e| DiscoveryError::Browse(e.to_string()))?;

        let resolved = self.resolved.clone();
        tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if !forward_event(event, &events, &resolved) {
                    break;
                }
            }
        });

        Ok(())
    }

    async fn stop_browse(&self, service_type: &str) -> Result<()> {
        self.daemon
            .stop_browse(service_type)
            .map_err(|e| DiscoveryError::StopBrowse(e.to_string()))
    }

    async fn resolve(&self, service_name: &str) -> Result<ServiceAddress> {
        self.resolved.wait_for(service_name).await
    }
}

/// Translate one mdns-sd event. Returns false once the browse is over.
fn forward_event(event: ServiceEvent, events: &BrowseEvents, resolved: &ResolvedCache) -> bool {
    let sighting = match event {
        ServiceEvent::ServiceFound(_, fullname) => {
            tracing::debug!(fullname, "Service found (pending resolution)");
            BrowseEvent::Found(instance_name(&fullname).to_string())
        }
        ServiceEvent::ServiceResolved(info) => {
            let name = instance_name(info.get_fullname()).to_string();
            let resolution = pick_address(info.get_addresses(), info.get_port());
            match &resolution {
                Ok(address) => tracing::debug!(service = %name, %address, "Service resolved"),
                Err(reason) => {
                    tracing::debug!(service = %name, reason, "Service resolved without an address")
                }
            }
            resolved.record(&name, resolution);
            // A resolved record is also proof of life.
            BrowseEvent::Found(name)
        }
        ServiceEvent::ServiceRemoved(_, fullname) => {
            let name = instance_name(&fullname).to_string();
            resolved.forget(&name);
            BrowseEvent::Lost(name)
        }
        ServiceEvent::SearchStopped(_) => return false,
        _ => return true,
    };

    events.send(sighting).is_ok()
}

/// "TFCStreamServer._http._tcp.local." -> "TFCStreamServer"
fn instance_name(fullname: &str) -> &str {
    fullname
        .find("._")
        .map(|i| &fullname[..i])
        .unwrap_or(fullname)
}

/// Prefer the first IPv4 address, fall back to any other.
fn pick_address(addresses: &HashSet<IpAddr>, port: u16) -> Resolution {
    addresses
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addresses.iter().next())
        .map(|ip| ServiceAddress::new(ip.to_string(), port))
        .ok_or_else(|| "record carries no address".to_string())
}
