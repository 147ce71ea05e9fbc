use serde::Serialize;

use crate::{ErrorCode, IngestStatus, JobId, ProgressInfo};

/// Coarse lifecycle of the tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

/// Everything an observer needs to render the ingest flow.
///
/// Mutated only through [`crate::update`]; observers receive clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub is_loading: bool,
    pub job_id: Option<JobId>,
    pub job_status: Option<IngestStatus>,
    pub progress: ProgressInfo,
    pub is_polling: bool,
    /// Completed waits in the current poll loop.
    pub poll_count: u32,
    pub is_valid_url: bool,
    pub active_job_count: u32,
    pub is_job_limit_reached: bool,
    pub error_message: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub can_retry: bool,
    pub retry_label: Option<String>,
    pub recipe_id: Option<String>,
    /// Tag of the latest accepted submit; answers carrying another tag are stale.
    #[serde(skip)]
    pub submission: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            is_loading: false,
            job_id: None,
            job_status: None,
            progress: ProgressInfo::idle(),
            is_polling: false,
            poll_count: 0,
            is_valid_url: false,
            active_job_count: 0,
            is_job_limit_reached: false,
            error_message: None,
            error_code: None,
            can_retry: false,
            retry_label: None,
            recipe_id: None,
            submission: 0,
        }
    }

    pub fn is_tracking(&self, job_id: &str) -> bool {
        self.is_polling && self.job_id.as_deref() == Some(job_id)
    }

    /// True while the submit tagged `submission` is the one still in flight.
    pub fn is_awaiting_submission(&self, submission: u64) -> bool {
        self.phase == SessionPhase::Submitting && self.submission == submission
    }

    /// Drops everything tied to the previous job. URL validity and the
    /// active-job count describe the user and server, not the job, so they stay.
    pub(crate) fn reset_job(&mut self) {
        self.job_id = None;
        self.job_status = None;
        self.progress = ProgressInfo::idle();
        self.is_polling = false;
        self.poll_count = 0;
        self.recipe_id = None;
        self.clear_error();
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_message = None;
        self.error_code = None;
        self.can_retry = false;
        self.retry_label = None;
    }

    pub(crate) fn stop_tracking(&mut self) {
        self.is_polling = false;
        self.is_loading = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
