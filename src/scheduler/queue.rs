//! FIFO request queue drained by a single worker task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Instant};

use crate::config::{SchedulerConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::scheduler::{SchedulerError, SchedulerState};
use crate::upstream::{RawResponse, Transport, TransportError};

/// Timing and status settings for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Minimum spacing between the start of two dispatches.
    pub dispatch_interval: Duration,
    /// How long to fast-fail after an overload response.
    pub busy_cooldown: Duration,
    /// Status code the remote uses to signal overload.
    pub busy_status: u16,
    /// Deadline for a single dispatch.
    pub request_timeout: Duration,
}

impl SchedulerSettings {
    pub fn from_config(scheduler: &SchedulerConfig, upstream: &UpstreamConfig) -> Self {
        Self {
            dispatch_interval: Duration::from_millis(scheduler.dispatch_interval_ms),
            busy_cooldown: Duration::from_secs(scheduler.busy_cooldown_secs),
            busy_status: scheduler.busy_status,
            request_timeout: Duration::from_secs(upstream.request_timeout_secs),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default(), &UpstreamConfig::default())
    }
}

type Reply = oneshot::Sender<Result<RawResponse, SchedulerError>>;

struct Job {
    url: String,
    reply: Reply,
}

impl Job {
    /// URL without its query string; the query carries the credential.
    fn label(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

struct Shared {
    state: Mutex<SchedulerState>,
    settings: SchedulerSettings,
    queued: AtomicUsize,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serializes every outbound call through one worker.
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone)]
pub struct RequestScheduler {
    tx: mpsc::UnboundedSender<Job>,
    shared: Arc<Shared>,
}

impl RequestScheduler {
    /// Create the scheduler and spawn its worker on the current runtime.
    pub fn new(transport: Arc<dyn Transport>, settings: SchedulerSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState::default()),
            settings,
            queued: AtomicUsize::new(0),
        });

        tokio::spawn(run_worker(rx, transport, shared.clone()));

        Self { tx, shared }
    }

    /// Queue one GET and wait for its turn and its response.
    ///
    /// Fails immediately with `Busy` while an overload cooldown is active.
    pub async fn enqueue(&self, url: impl Into<String>) -> Result<RawResponse, SchedulerError> {
        if self.shared.state().is_busy(Instant::now()) {
            metrics::record_busy_rejection();
            return Err(SchedulerError::Busy);
        }

        let (reply, rx) = oneshot::channel();
        let depth = self.shared.queued.fetch_add(1, Ordering::Relaxed) + 1;
        if self.tx.send(Job { url: url.into(), reply }).is_err() {
            self.shared.queued.fetch_sub(1, Ordering::Relaxed);
            return Err(SchedulerError::Stopped);
        }
        metrics::record_queue_depth(depth);

        rx.await.map_err(|_| SchedulerError::Stopped)?
    }

    /// Remaining overload cooldown, if one is active.
    pub fn busy_remaining(&self) -> Option<Duration> {
        self.shared.state().busy_remaining(Instant::now())
    }

    /// Jobs waiting for the worker, including the one being dispatched.
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.shared.settings
    }
}

impl std::fmt::Debug for RequestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScheduler")
            .field("settings", &self.shared.settings)
            .field("queued", &self.queued())
            .finish()
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Job>,
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
) {
    tracing::debug!(settings = ?shared.settings, "Request scheduler worker started");

    while let Some(job) = rx.recv().await {
        let result = process(&job, transport.as_ref(), &shared).await;
        let depth = shared.queued.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        metrics::record_queue_depth(depth);

        if let Some(result) = result {
            // The caller may have given up in the meantime.
            let _ = job.reply.send(result);
        }
    }

    tracing::debug!("Request scheduler worker stopped");
}

/// Run one job. `None` means the caller went away and nothing was sent.
async fn process(
    job: &Job,
    transport: &dyn Transport,
    shared: &Shared,
) -> Option<Result<RawResponse, SchedulerError>> {
    let settings = &shared.settings;

    if job.reply.is_closed() {
        tracing::debug!(path = %job.label(), "Caller gone, skipping dispatch");
        return None;
    }

    // Jobs queued before an overload observe the same window at their turn.
    if shared.state().is_busy(Instant::now()) {
        metrics::record_busy_rejection();
        return Some(Err(SchedulerError::Busy));
    }

    let slot = shared.state().next_slot(settings.dispatch_interval);
    if let Some(slot) = slot {
        tokio::time::sleep_until(slot).await;
    }

    let started = Instant::now();
    shared.state().record_dispatch(started);
    tracing::debug!(path = %job.label(), "Dispatching upstream request");

    let result = match timeout(settings.request_timeout, transport.get(&job.url)).await {
        Ok(Ok(response)) if response.status == settings.busy_status => {
            shared.state().mark_busy(Instant::now(), settings.busy_cooldown);
            tracing::warn!(
                path = %job.label(),
                status = response.status,
                cooldown_secs = settings.busy_cooldown.as_secs(),
                "Upstream overloaded, entering cooldown"
            );
            metrics::record_dispatch("busy", started.elapsed());
            Err(SchedulerError::Busy)
        }
        Ok(Ok(response)) => {
            metrics::record_dispatch("completed", started.elapsed());
            Ok(response)
        }
        Ok(Err(TransportError::Timeout)) | Err(_) => {
            tracing::warn!(path = %job.label(), "Upstream request timed out");
            metrics::record_dispatch("timeout", started.elapsed());
            Err(SchedulerError::UpstreamTimeout)
        }
        Ok(Err(e)) => {
            tracing::error!(path = %job.label(), error = %e, "Upstream request failed");
            metrics::record_dispatch("error", started.elapsed());
            Err(SchedulerError::Upstream(e.to_string()))
        }
    };

    Some(result)
}
