// Project-wide constants
//
// Centralised here so service names, intervals and timeouts have one
// source of truth. Import via `use crate::config::constants::*;`.

/// DNS-SD service type the display server advertises under.
pub const DEFAULT_SERVICE_TYPE: &str = "_http._tcp.local.";

/// Token that must appear (case-insensitive) in the advertised instance name.
pub const DEFAULT_TARGET_NAME: &str = "TFCStreamServer";

/// Discovery tick and watchdog tick, in milliseconds.
pub const DEFAULT_DISCOVERY_INTERVAL_MS: u64 = 2000;

/// Upper bound for a single resolve before it counts as failed.
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 5000;

/// A found service is declared lost after this many intervals without a sighting.
pub const LIVENESS_INTERVALS: u32 = 2;

/// TCP connect timeout for score pushes.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Whole-request timeout for score pushes.
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;

/// Path on the display server that accepts score snapshots.
pub const SCORES_PATH: &str = "/scores";

/// Event name used when nothing is configured.
pub const DEFAULT_EVENT_NAME: &str = "MTFV Landesliga 2025";

/// Placeholder the lineup pickers use for an empty slot.
pub const NO_PLAYER: &str = "No player";
