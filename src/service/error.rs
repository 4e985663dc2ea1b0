use thiserror::Error;

/// Errors raised by a discovery primitive.
///
/// None of these are fatal to the monitor: browse errors are reported as a
/// status and retried on the next tick, resolve errors keep it searching.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to start discovery: {0}")]
    Browse(String),

    #[error("Failed to stop discovery: {0}")]
    StopBrowse(String),

    #[error("Resolve failed for {service}: {reason}")]
    Resolve { service: String, reason: String },

    #[error("Resolve timed out for {0}")]
    ResolveTimeout(String),

    #[error("mDNS daemon error: {0}")]
    Daemon(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
