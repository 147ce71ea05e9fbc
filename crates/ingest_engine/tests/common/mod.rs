#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ingest_core::{ErrorTable, IngestStatus, JobDetails, JobHandle, SessionConfig, SessionState};
use ingest_engine::{IngestSession, JobRepository, RepositoryError};
use tokio::sync::watch;
use tokio::time::Instant;

pub const VIDEO_URL: &str = "https://www.tiktok.com/@chef/video/7";

/// In-memory repository that replays scripted answers and records calls.
pub struct ScriptedRepository {
    start: Mutex<Result<JobHandle, RepositoryError>>,
    /// Answers to the first submissions, each after its delay; then `start`.
    start_script: Mutex<VecDeque<(Duration, Result<JobHandle, RepositoryError>)>>,
    polls: Mutex<VecDeque<Result<JobDetails, RepositoryError>>>,
    /// Answer once the script runs out.
    idle_status: IngestStatus,
    count: Mutex<Result<u32, RepositoryError>>,
    poll_delay: Duration,
    start_calls: Mutex<Vec<String>>,
    poll_times: Mutex<Vec<Instant>>,
    count_calls: Mutex<usize>,
}

impl ScriptedRepository {
    pub fn new(job_id: &str) -> Self {
        Self {
            start: Mutex::new(Ok(JobHandle {
                job_id: job_id.to_string(),
                status: IngestStatus::Queued,
            })),
            start_script: Mutex::new(VecDeque::new()),
            polls: Mutex::new(VecDeque::new()),
            idle_status: IngestStatus::Queued,
            count: Mutex::new(Ok(0)),
            poll_delay: Duration::ZERO,
            start_calls: Mutex::new(Vec::new()),
            poll_times: Mutex::new(Vec::new()),
            count_calls: Mutex::new(0),
        }
    }

    pub fn with_start(self, result: Result<JobHandle, RepositoryError>) -> Self {
        *self.start.lock().unwrap() = result;
        self
    }

    pub fn with_delayed_starts(
        self,
        starts: impl IntoIterator<Item = (Duration, Result<JobHandle, RepositoryError>)>,
    ) -> Self {
        self.start_script.lock().unwrap().extend(starts);
        self
    }

    pub fn with_polls(
        self,
        polls: impl IntoIterator<Item = Result<JobDetails, RepositoryError>>,
    ) -> Self {
        self.polls.lock().unwrap().extend(polls);
        self
    }

    pub fn with_count(self, result: Result<u32, RepositoryError>) -> Self {
        *self.count.lock().unwrap() = result;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn start_calls(&self) -> Vec<String> {
        self.start_calls.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    pub fn poll_gaps(&self) -> Vec<Duration> {
        let times = self.poll_times.lock().unwrap();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn count_calls(&self) -> usize {
        *self.count_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl JobRepository for ScriptedRepository {
    async fn start_ingest(&self, url: &str) -> Result<JobHandle, RepositoryError> {
        self.start_calls.lock().unwrap().push(url.to_string());
        let scripted = self.start_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => self.start.lock().unwrap().clone(),
        }
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobDetails, RepositoryError> {
        self.poll_times.lock().unwrap().push(Instant::now());
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        let next = self.polls.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(JobDetails::new(job_id, self.idle_status)))
    }

    async fn active_job_count(&self) -> Result<u32, RepositoryError> {
        *self.count_calls.lock().unwrap() += 1;
        self.count.lock().unwrap().clone()
    }
}

pub fn fast_config() -> SessionConfig {
    SessionConfig {
        base_interval_ms: 4_000,
        backoff_interval_ms: 8_000,
        backoff_threshold: 3,
        ..SessionConfig::default()
    }
}

pub fn queued(job_id: &str) -> JobHandle {
    JobHandle {
        job_id: job_id.to_string(),
        status: IngestStatus::Queued,
    }
}

pub fn session_with(repository: &Arc<ScriptedRepository>) -> IngestSession {
    IngestSession::new(repository.clone(), Arc::new(ErrorTable), fast_config())
}

pub async fn wait_until(
    rx: &mut watch::Receiver<SessionState>,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    rx.wait_for(predicate)
        .await
        .expect("session dropped its sender")
        .clone()
}
