// Display server discovery
//
// Finds the display server on the local network and keeps track of
// whether it is still there.

pub mod browser;
pub mod discovery;
pub mod error;
pub mod monitor;
pub mod status;

pub use browser::{matches_target, BrowseEvent, BrowseEvents, ServiceAddress, ServiceBrowser};
pub use discovery::MdnsBrowser;
pub use error::DiscoveryError;
pub use monitor::{DiscoveryMonitor, DiscoveryState};
pub use status::{StatusEvent, StatusObserver};
