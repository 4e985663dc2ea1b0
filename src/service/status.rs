// Connection status notifications
//
// The only signal the monitor sends outward. Observers are called
// synchronously from whichever loop detected the transition, so UI code
// should hand the event over to its own thread.

use std::fmt;

use super::browser::ServiceAddress;

/// Discovery/connection status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Starting or stopping a browse failed; the next tick tries again.
    DiscoveryFailed { reason: String },
    /// No address known; discovery attempts are being issued.
    Searching { target: String },
    /// A matching instance was sighted and is being resolved.
    Found { service_name: String },
    /// Resolve succeeded; the address is now available.
    Connected {
        service_name: String,
        address: ServiceAddress,
    },
    ResolveFailed { service_name: String, reason: String },
    /// The service went away or was not sighted within the liveness window.
    Lost { service_name: String },
    /// Discovery was stopped explicitly.
    Stopped,
}

impl StatusEvent {
    pub fn is_connected(&self) -> bool {
        matches!(self, StatusEvent::Connected { .. })
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::DiscoveryFailed { reason } => write!(f, "Discovery failed: {}", reason),
            StatusEvent::Searching { target } => write!(f, "Searching for {}...", target),
            StatusEvent::Found { service_name } => {
                write!(f, "Found target service: {}", service_name)
            }
            StatusEvent::Connected {
                service_name,
                address,
            } => write!(f, "Connected to {} at {}", service_name, address),
            StatusEvent::ResolveFailed {
                service_name,
                reason,
            } => write!(f, "Service resolution failed for {}: {}", service_name, reason),
            StatusEvent::Lost { service_name } => {
                write!(f, "Service {} lost - searching...", service_name)
            }
            StatusEvent::Stopped => write!(f, "Discovery stopped"),
        }
    }
}

/// Receives every status transition.
pub trait StatusObserver: Send + Sync {
    fn notify(&self, status: &StatusEvent);
}

impl<F> StatusObserver for F
where
    F: Fn(&StatusEvent) + Send + Sync,
{
    fn notify(&self, status: &StatusEvent) {
        self(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connected_is_connected() {
        let connected = StatusEvent::Connected {
            service_name: "TFCStreamServer".to_string(),
            address: ServiceAddress::new("10.0.0.5", 8080),
        };
        assert!(connected.is_connected());
        assert_eq!(
            connected.to_string(),
            "Connected to TFCStreamServer at 10.0.0.5:8080"
        );

        let others = [
            StatusEvent::Searching {
                target: "TFCStreamServer".to_string(),
            },
            StatusEvent::Found {
                service_name: "TFCStreamServer".to_string(),
            },
            StatusEvent::Lost {
                service_name: "TFCStreamServer".to_string(),
            },
            StatusEvent::Stopped,
        ];
        assert!(others.iter().all(|s| !s.is_connected()));
    }

    #[test]
    fn test_closure_observer() {
        use std::sync::Mutex;

        let seen = Mutex::new(Vec::new());
        let observer = |status: &StatusEvent| seen.lock().unwrap().push(status.to_string());
        observer.notify(&StatusEvent::Stopped);

        assert_eq!(seen.lock().unwrap().as_slice(), ["Discovery stopped"]);
    }
}
