// Discovery-and-liveness monitor
//
// Two cooperative loops share one small piece of state:
//
//   discovery loop - while Searching, issues one browse per tick and handles
//                    sightings (resolve on first match, refresh afterwards)
//   watchdog loop  - while Found, declares the service lost once it has not
//                    been sighted for LIVENESS_INTERVALS ticks
//
// State is behind a std Mutex that is never held across an await, and
// observers are always notified after the lock is released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::browser::{matches_target, BrowseEvent, BrowseEvents, ServiceAddress, ServiceBrowser};
use super::error::DiscoveryError;
use super::status::{StatusEvent, StatusObserver};
use crate::config::DiscoverySettings;

/// The monitor's belief about the display server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryState {
    Searching,
    Found {
        address: ServiceAddress,
        service_name: String,
        last_seen: Instant,
    },
}

impl DiscoveryState {
    pub fn address(&self) -> Option<&ServiceAddress> {
        match self {
            DiscoveryState::Searching => None,
            DiscoveryState::Found { address, .. } => Some(address),
        }
    }
}

struct Shared {
    browser: Arc<dyn ServiceBrowser>,
    observer: Arc<dyn StatusObserver>,
    settings: DiscoverySettings,
    state: Mutex<DiscoveryState>,
    attempts: AtomicU64,
}

struct Running {
    cancel: CancellationToken,
    discovery: JoinHandle<()>,
    watchdog: JoinHandle<()>,
}

/// Tracks whether the display server is reachable and where.
pub struct DiscoveryMonitor {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

impl DiscoveryMonitor {
    pub fn new(
        browser: Arc<dyn ServiceBrowser>,
        observer: Arc<dyn StatusObserver>,
        settings: DiscoverySettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                browser,
                observer,
                settings,
                state: Mutex::new(DiscoveryState::Searching),
                attempts: AtomicU64::new(0),
            }),
            running: Mutex::new(None),
        }
    }

    /// Reset to Searching and (re)start both loops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let previous = lock_or_recover(&self.running).take();
        // The new loop stops the old browse before its first one.
        let browsing = previous.is_some();
        if let Some(previous) = previous {
            previous.abort();
        }

        self.shared.set_state(DiscoveryState::Searching);
        info!(
            service_type = %self.shared.settings.service_type,
            target = %self.shared.settings.target_name,
            interval_ms = self.shared.settings.interval_ms,
            "Starting service discovery"
        );
        self.shared.observer.notify(&StatusEvent::Searching {
            target: self.shared.settings.target_name.clone(),
        });

        let cancel = CancellationToken::new();
        let discovery = tokio::spawn(run_discovery(
            self.shared.clone(),
            cancel.clone(),
            browsing,
        ));
        let watchdog = tokio::spawn(run_watchdog(self.shared.clone(), cancel.clone()));

        *lock_or_recover(&self.running) = Some(Running {
            cancel,
            discovery,
            watchdog,
        });
    }

    /// Cancel both loops, stop any active browse and forget the address.
    pub async fn stop(&self) {
        let running = lock_or_recover(&self.running).take();
        let Some(running) = running else {
            return;
        };

        running.cancel.cancel();
        let _ = running.discovery.await;
        let _ = running.watchdog.await;

        if let Err(e) = self
            .shared
            .browser
            .stop_browse(&self.shared.settings.service_type)
            .await
        {
            debug!(error = %e, "Failed to stop browse during shutdown");
        }

        self.shared.set_state(DiscoveryState::Searching);
        info!("Service discovery stopped");
        self.shared.observer.notify(&StatusEvent::Stopped);
    }

    pub fn is_running(&self) -> bool {
        lock_or_recover(&self.running).is_some()
    }

    /// Last known (host, port), or (None, None).
    ///
    /// May be stale by up to one interval past the last real sighting.
    pub fn connection_details(&self) -> (Option<String>, Option<u16>) {
        match self.address() {
            Some(addr) => (Some(addr.host), Some(addr.port)),
            None => (None, None),
        }
    }

    pub fn address(&self) -> Option<ServiceAddress> {
        self.shared.state().address().cloned()
    }

    pub fn state(&self) -> DiscoveryState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.shared.state(), DiscoveryState::Found { .. })
    }

    /// Number of discovery attempts issued since construction.
    pub fn attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::SeqCst)
    }
}

impl Drop for DiscoveryMonitor {
    fn drop(&mut self) {
        let Some(running) = lock_or_recover(&self.running).take() else {
            return;
        };
        running.abort();

        // Outside a runtime the browse dies with the browser's daemon.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let shared = self.shared.clone();
            runtime.spawn(async move {
                if let Err(e) = shared.browser.stop_browse(&shared.settings.service_type).await {
                    debug!(error = %e, "Failed to stop browse on drop");
                }
            });
        }
    }
}

impl Running {
    fn abort(self) {
        self.cancel.cancel();
        self.discovery.abort();
        self.watchdog.abort();
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn state(&self) -> DiscoveryState {
        lock_or_recover(&self.state).clone()
    }

    fn set_state(&self, state: DiscoveryState) {
        *lock_or_recover(&self.state) = state;
    }

    fn is_searching(&self) -> bool {
        matches!(*lock_or_recover(&self.state), DiscoveryState::Searching)
    }

    /// One discovery attempt: drop the previous browse, start a fresh one.
    async fn attempt(&self, events: &BrowseEvents, browsing: &mut bool) {
        let service_type = &self.settings.service_type;

        if *browsing {
            if let Err(e) = self.browser.stop_browse(service_type).await {
                warn!(error = %e, "Failed to stop previous browse");
                self.observer.notify(&StatusEvent::DiscoveryFailed {
                    reason: e.to_string(),
                });
            }
            *browsing = false;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(attempt, service_type = %service_type, "Discovery attempt");

        match self.browser.browse(service_type, events.clone()).await {
            Ok(()) => *browsing = true,
            Err(e) => {
                warn!(attempt, error = %e, "Discovery failed to start");
                self.observer.notify(&StatusEvent::DiscoveryFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn handle_event(&self, event: BrowseEvent, cancel: &CancellationToken) {
        if !matches_target(event.service_name(), &self.settings.target_name) {
            tracing::trace!(service = event.service_name(), "Ignoring non-matching service");
            return;
        }

        match event {
            BrowseEvent::Found(name) => self.handle_found(name, cancel).await,
            BrowseEvent::Lost(name) => {
                debug!(service = %name, "Target service reported lost");
                self.declare_lost(Some(&name));
            }
        }
    }

    async fn handle_found(&self, name: String, cancel: &CancellationToken) {
        {
            let mut state = lock_or_recover(&self.state);
            if let DiscoveryState::Found {
                service_name,
                last_seen,
                ..
            } = &mut *state
            {
                if service_name.eq_ignore_ascii_case(&name) {
                    *last_seen = Instant::now();
                    debug!(service = %name, "Refreshed liveness");
                }
                return;
            }
        }

        info!(service = %name, "Found target service, resolving");
        self.observer.notify(&StatusEvent::Found {
            service_name: name.clone(),
        });

        let resolved = tokio::select! {
            _ = cancel.cancelled() => return,
            r = time::timeout(self.settings.resolve_timeout(), self.browser.resolve(&name)) => {
                r.unwrap_or_else(|_| Err(DiscoveryError::ResolveTimeout(name.clone())))
            }
        };

        match resolved {
            Ok(address) => {
                {
                    let mut state = lock_or_recover(&self.state);
                    if !matches!(*state, DiscoveryState::Searching) {
                        return;
                    }
                    *state = DiscoveryState::Found {
                        address: address.clone(),
                        service_name: name.clone(),
                        last_seen: Instant::now(),
                    };
                }
                info!(service = %name, host = %address.host, port = address.port, "Resolved display server");
                self.observer.notify(&StatusEvent::Connected {
                    service_name: name,
                    address,
                });
            }
            Err(e) => {
                warn!(service = %name, error = %e, "Service resolution failed");
                self.observer.notify(&StatusEvent::ResolveFailed {
                    service_name: name,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Found -> Searching. With `only` set, the loss applies only if it names
    /// the service currently held.
    fn declare_lost(&self, only: Option<&str>) {
        let lost = {
            let mut state = lock_or_recover(&self.state);
            match &*state {
                DiscoveryState::Found { service_name, .. }
                    if only.map_or(true, |n| n.eq_ignore_ascii_case(service_name)) =>
                {
                    let name = service_name.clone();
                    *state = DiscoveryState::Searching;
                    Some(name)
                }
                _ => None,
            }
        };

        if let Some(service_name) = lost {
            info!(service = %service_name, "Display server lost, resuming discovery");
            self.observer.notify(&StatusEvent::Lost { service_name });
        }
    }

    fn check_liveness(&self) {
        let expired = match &*lock_or_recover(&self.state) {
            DiscoveryState::Found { last_seen, .. } => {
                last_seen.elapsed() >= self.settings.liveness_timeout()
            }
            DiscoveryState::Searching => false,
        };

        if expired {
            debug!("Service timeout detected");
            self.declare_lost(None);
        }
    }
}

async fn run_discovery(shared: Arc<Shared>, cancel: CancellationToken, mut browsing: bool) {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut ticker = time::interval(shared.settings.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if shared.is_searching() {
                    shared.attempt(&events_tx, &mut browsing).await;
                }
            }
            Some(event) = events_rx.recv() => shared.handle_event(event, &cancel).await,
        }
    }

    debug!("Discovery loop exited");
}

async fn run_watchdog(shared: Arc<Shared>, cancel: CancellationToken) {
    let mut ticker = time::interval(shared.settings.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => shared.check_liveness(),
        }
    }

    debug!("Watchdog loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::error::Result as DiscoveryResult;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Browser that sights `name` on every browse and resolves it after `delay`.
    struct SlowResolver {
        name: String,
        delay: Duration,
    }

    #[async_trait]
    impl ServiceBrowser for SlowResolver {
        async fn browse(&self, _service_type: &str, events: BrowseEvents) -> DiscoveryResult<()> {
            let _ = events.send(BrowseEvent::Found(self.name.clone()));
            Ok(())
        }

        async fn stop_browse(&self, _service_type: &str) -> DiscoveryResult<()> {
            Ok(())
        }

        async fn resolve(&self, _service_name: &str) -> DiscoveryResult<ServiceAddress> {
            time::sleep(self.delay).await;
            Ok(ServiceAddress::new("10.0.0.9", 9000))
        }
    }

    fn settings() -> DiscoverySettings {
        DiscoverySettings {
            resolve_timeout_ms: 1000,
            ..DiscoverySettings::default()
        }
    }

    fn quiet_observer() -> Arc<dyn StatusObserver> {
        Arc::new(|_: &StatusEvent| {})
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_timeout_keeps_searching() {
        let browser = Arc::new(SlowResolver {
            name: "TFCStreamServer".to_string(),
            delay: Duration::from_secs(60),
        });
        let monitor = DiscoveryMonitor::new(browser, quiet_observer(), settings());
        monitor.start();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(monitor.state(), DiscoveryState::Searching);
        assert_eq!(monitor.connection_details(), (None, None));

        monitor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_within_timeout_connects() {
        let browser = Arc::new(SlowResolver {
            name: "TFCStreamServer".to_string(),
            delay: Duration::from_millis(200),
        });
        let monitor = DiscoveryMonitor::new(browser, quiet_observer(), settings());
        monitor.start();

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            monitor.connection_details(),
            (Some("10.0.0.9".to_string()), Some(9000))
        );
        assert!(monitor.is_connected());

        monitor.stop().await;
        assert!(!monitor.is_running());
        assert_eq!(monitor.address(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_start_is_noop() {
        let browser = Arc::new(SlowResolver {
            name: "TFCStreamServer".to_string(),
            delay: Duration::ZERO,
        });
        let monitor = DiscoveryMonitor::new(browser, quiet_observer(), settings());
        monitor.stop().await;
        assert_eq!(monitor.attempts(), 0);
    }
}
