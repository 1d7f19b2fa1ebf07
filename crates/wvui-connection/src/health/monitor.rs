//! Status monitor with periodic probing

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use wvui_core::{ConnectionStatus, HealthProbe};

/// Configuration for status monitoring
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between periodic probes
    pub poll_interval: Duration,
}

impl MonitorConfig {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// What happened to a probe request
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The result was current and is now the published status
    Published(ConnectionStatus),
    /// The connection changed or the monitor stopped while the probe was in flight
    Discarded,
    /// Another probe was already running
    Skipped,
}

/// Polls a health probe and publishes generation-checked status snapshots.
pub struct StatusMonitor<P: HealthProbe> {
    inner: Arc<MonitorInner<P>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct MonitorInner<P> {
    probe: P,
    config: MonitorConfig,
    probing: AtomicBool,
    /// Bumped by `stop` so in-flight probes are discarded
    epoch: AtomicU64,
    status: watch::Sender<Option<ConnectionStatus>>,
}

/// Returns the monitor to idle when the probe finishes or is dropped.
struct ProbingGuard<'a>(&'a AtomicBool);

impl Drop for ProbingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<P: HealthProbe> MonitorInner<P> {
    async fn run_probe(&self) -> ProbeOutcome {
        if self
            .probing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("probe already in flight, skipping");
            return ProbeOutcome::Skipped;
        }
        let _guard = ProbingGuard(&self.probing);

        let generation = self.probe.generation();
        let epoch = self.epoch.load(Ordering::SeqCst);
        tracing::debug!(generation, "probing connection");

        let status = self.probe.check_connection().await;

        let current = self.probe.generation();
        if current != generation {
            tracing::debug!(
                issued = generation,
                current,
                url = %status.url,
                "connection changed during probe, discarding result"
            );
            return ProbeOutcome::Discarded;
        }
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(url = %status.url, "monitor stopped during probe, discarding result");
            return ProbeOutcome::Discarded;
        }

        if status.connected {
            tracing::debug!(url = %status.url, version = ?status.version(), "connection healthy");
        } else {
            tracing::warn!(url = %status.url, error = ?status.error, "connection check failed");
        }
        self.status.send_replace(Some(status.clone()));
        ProbeOutcome::Published(status)
    }
}

impl<P: HealthProbe> StatusMonitor<P> {
    /// Create an idle monitor. Nothing is probed until `start` or `probe_now`.
    pub fn new(probe: P, config: MonitorConfig) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            inner: Arc::new(MonitorInner {
                probe,
                config,
                probing: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                status,
            }),
            task: Mutex::new(None),
        }
    }

    /// Create a monitor with the default 30 second interval.
    pub fn with_defaults(probe: P) -> Self {
        Self::new(probe, MonitorConfig::default())
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Last published status, `None` before the first successful publish.
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.inner.status.borrow().clone()
    }

    /// Receive every published status.
    pub fn subscribe(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.inner.status.subscribe()
    }

    /// Whether a probe is in flight.
    pub fn is_probing(&self) -> bool {
        self.inner.probing.load(Ordering::SeqCst)
    }

    /// Whether the periodic task is running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Probe immediately, unless a probe is already in flight.
    pub async fn probe_now(&self) -> ProbeOutcome {
        self.inner.run_probe().await
    }

    /// Start periodic probing. The first probe is issued immediately.
    /// Must be called within a tokio runtime; calling it while running is a
    /// no-op.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let inner = self.inner.clone();
        let interval = inner.config.poll_interval;
        tracing::info!(interval_ms = interval.as_millis() as u64, "starting status monitor");

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Probes run detached so stopping the timer never cuts one short.
                let inner = inner.clone();
                tokio::spawn(async move {
                    inner.run_probe().await;
                });
            }
        }));
    }

    /// Stop periodic probing. A probe already in flight finishes, but its
    /// result is discarded.
    pub fn stop(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            tracing::info!("status monitor stopped");
        }
    }
}

impl<P: HealthProbe> Drop for StatusMonitor<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
