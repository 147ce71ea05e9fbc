use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ingest_core::{
    update, Effect, ErrorClassifier, JobId, Msg, PollSchedule, SessionConfig, SessionRules,
    SessionState,
};
use ingest_logging::{ingest_debug, ingest_info, ingest_trace, ingest_warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::JobRepository;

pub(crate) type SessionSlot = Mutex<Option<IngestSession>>;

/// Tracks one ingestion job from submission to a terminal status.
///
/// Cloning yields another handle to the same session. State changes are
/// published through [`IngestSession::subscribe`]; every mutation goes through
/// the operations below. Operations that start background work must be called
/// from within a Tokio runtime.
#[derive(Clone)]
pub struct IngestSession {
    inner: Arc<Inner>,
}

struct Inner {
    rules: SessionRules,
    config: SessionConfig,
    repository: Arc<dyn JobRepository>,
    current: Mutex<Current>,
    state_tx: watch::Sender<SessionState>,
    /// Revision of the snapshot last offered to `state_tx`.
    published: AtomicU64,
    poller: Mutex<Option<PollTask>>,
    disposed: AtomicBool,
    registry_slot: Option<Weak<SessionSlot>>,
}

struct Current {
    revision: u64,
    state: SessionState,
}

struct PollTask {
    job_id: JobId,
    cancel: CancellationToken,
    // Kept so the loop is owned by the session; never aborted, only cancelled.
    _handle: JoinHandle<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl IngestSession {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        classifier: Arc<dyn ErrorClassifier>,
        config: SessionConfig,
    ) -> Self {
        Self::build(repository, classifier, config, None)
    }

    pub(crate) fn build(
        repository: Arc<dyn JobRepository>,
        classifier: Arc<dyn ErrorClassifier>,
        config: SessionConfig,
        registry_slot: Option<Weak<SessionSlot>>,
    ) -> Self {
        let state = SessionState::new();
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(Inner {
                rules: SessionRules::new(&config, classifier),
                config,
                repository,
                current: Mutex::new(Current {
                    revision: 0,
                    state,
                }),
                state_tx,
                published: AtomicU64::new(0),
                poller: Mutex::new(None),
                disposed: AtomicBool::new(false),
                registry_slot,
            }),
        }
    }

    /// Latest state snapshot.
    pub fn state(&self) -> SessionState {
        lock(&self.inner.current).state.clone()
    }

    /// A receiver that sees every published state, starting with the current one.
    ///
    /// Holding a `borrow()` blocks publication; release it before calling
    /// operations that change state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Checks `url` against the supported platforms without touching the network.
    pub fn validate_url(&self, url: &str) -> bool {
        self.inner.dispatch(Msg::ValidateUrl(url.to_string()));
        self.state().is_valid_url
    }

    /// Submits `url` and, once the service accepts it, starts polling.
    ///
    /// Returns after the submission call resolves. Ignored while a job is
    /// already loading.
    pub async fn submit(&self, url: &str) {
        let effects = self.inner.dispatch(Msg::Submit(url.to_string()));
        for effect in effects {
            match effect {
                Effect::StartIngest { submission, url } => {
                    self.inner.start_ingest(submission, url).await
                }
                other => self.inner.run_effect(other),
            }
        }
    }

    /// Resumes polling the failed job. Ignored unless the failure is recoverable.
    pub fn retry(&self) {
        let effects = self.inner.dispatch(Msg::Retry);
        if effects.is_empty() {
            ingest_debug!("Retry ignored: no recoverable failure");
        }
        self.inner.run_effects(effects);
    }

    /// Stops polling an in-flight job. The last known status is kept.
    pub fn cancel(&self) {
        let effects = self.inner.dispatch(Msg::Cancel);
        self.inner.run_effects(effects);
    }

    /// Refreshes the active-job count; a failing count service allows submissions.
    pub async fn check_active_job_count(&self) {
        self.inner.check_active_job_count().await;
    }

    pub(crate) fn spawn_active_job_count_check(&self) {
        self.inner.run_effect(Effect::CheckActiveJobCount);
    }

    /// Cancels any poll loop and releases the registry slot if this session holds it.
    ///
    /// Every operation on a disposed session is a no-op.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.stop_polling();
        if let Some(slot) = self.inner.registry_slot.as_ref().and_then(Weak::upgrade) {
            let mut held = lock(&slot);
            if held.as_ref().is_some_and(|session| session.ptr_eq(self)) {
                *held = None;
            }
        }
        ingest_info!("Ingest session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// True when both handles point at the same session.
    pub fn ptr_eq(&self, other: &IngestSession) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Inner {
    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        if self.disposed.load(Ordering::Acquire) {
            return Vec::new();
        }
        let (revision, next, effects) = {
            let mut current = lock(&self.current);
            let (next, effects) = update(std::mem::take(&mut current.state), msg, &self.rules);
            current.state = next.clone();
            current.revision += 1;
            (current.revision, next, effects)
        };

        // Published outside the state lock. A dispatch that loses the race to a
        // newer one must not overwrite it.
        self.state_tx.send_if_modified(|published| {
            if revision < self.published.load(Ordering::Acquire) {
                return false;
            }
            self.published.store(revision, Ordering::Release);
            if *published == next {
                false
            } else {
                *published = next;
                true
            }
        });
        effects
    }

    fn run_effects(self: &Arc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(self: &Arc<Self>, effect: Effect) {
        match effect {
            // Only `Msg::Submit` yields it, and `submit` awaits it inline.
            Effect::StartIngest { .. } => {}
            Effect::StartPolling { job_id } => self.start_polling(job_id),
            Effect::StopPolling => self.stop_polling(),
            Effect::CheckActiveJobCount => {
                let inner = Arc::clone(self);
                tokio::spawn(async move { inner.check_active_job_count().await });
            }
        }
    }

    async fn start_ingest(self: &Arc<Self>, submission: u64, url: String) {
        ingest_info!(
            "StartIngest submission={} url_len={} url={}",
            submission,
            url.len(),
            url
        );
        let msg = match self.repository.start_ingest(&url).await {
            Ok(handle) => {
                ingest_info!(
                    "Ingest accepted job_id={} status={}",
                    handle.job_id,
                    handle.status
                );
                Msg::SubmitSucceeded { submission, handle }
            }
            Err(err) => {
                ingest_warn!("Ingest submission failed: {}", err);
                Msg::SubmitFailed {
                    submission,
                    message: err.to_string(),
                }
            }
        };
        let effects = self.dispatch(msg);
        self.run_effects(effects);
    }

    async fn check_active_job_count(self: &Arc<Self>) {
        let msg = match self.repository.active_job_count().await {
            Ok(count) => {
                ingest_debug!("Active job count {}", count);
                Msg::ActiveJobCountLoaded(count)
            }
            Err(err) => {
                ingest_warn!("Active job count unavailable, allowing submissions: {}", err);
                Msg::ActiveJobCountUnavailable
            }
        };
        let effects = self.dispatch(msg);
        self.run_effects(effects);
    }

    /// Replaces any running loop; there is never more than one per session.
    fn start_polling(self: &Arc<Self>, job_id: JobId) {
        let mut poller = lock(&self.poller);
        if let Some(previous) = poller.take() {
            ingest_debug!("Superseding poll loop job_id={}", previous.job_id);
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::downgrade(self),
            self.config.clone(),
            job_id.clone(),
            cancel.clone(),
        ));
        *poller = Some(PollTask {
            job_id,
            cancel,
            _handle: handle,
        });
    }

    fn stop_polling(&self) {
        if let Some(task) = lock(&self.poller).take() {
            ingest_debug!("Stopping poll loop job_id={}", task.job_id);
            task.cancel.cancel();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = poller.take() {
            task.cancel.cancel();
        }
    }
}

/// Polls `job_id` until it is terminal or `cancel` fires.
///
/// Holds the session only while a request or dispatch is in progress, so the
/// loop ends once every handle to the session is gone.
async fn poll_loop(
    session: Weak<Inner>,
    config: SessionConfig,
    job_id: JobId,
    cancel: CancellationToken,
) {
    let mut schedule = PollSchedule::new(&config);
    ingest_debug!("Poll loop started job_id={}", job_id);

    while !cancel.is_cancelled() {
        let Some(inner) = session.upgrade() else {
            break;
        };
        let polled = match inner.repository.poll_job(&job_id).await {
            Ok(details) => {
                // The user may have left while the request was in flight.
                if cancel.is_cancelled() {
                    break;
                }
                let details = details.with_job_id_fallback(&job_id);
                let status = details.status;
                ingest_trace!("Polled job_id={} status={}", job_id, status);
                let effects = inner.dispatch(Msg::JobPolled(details));
                inner.run_effects(effects);
                if status.is_terminal() {
                    ingest_info!(
                        "Job reached terminal status job_id={} status={}",
                        job_id,
                        status
                    );
                    break;
                }
                true
            }
            Err(err) => {
                // Job failures arrive as a FAILED status, so this is transport noise.
                ingest_warn!(
                    "Poll failed job_id={} poll_count={}: {}",
                    job_id,
                    schedule.poll_count(),
                    err
                );
                false
            }
        };
        drop(inner);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(schedule.current_interval()) => {}
        }

        if polled {
            let Some(inner) = session.upgrade() else {
                break;
            };
            let poll_count = schedule.advance();
            inner.dispatch(Msg::PollTick {
                job_id: job_id.clone(),
                poll_count,
            });
        }
    }

    ingest_debug!("Poll loop finished job_id={}", job_id);
}
