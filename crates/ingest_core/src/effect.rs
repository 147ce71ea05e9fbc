use crate::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `submission` must come back on the matching `SubmitSucceeded`/`SubmitFailed`.
    StartIngest { submission: u64, url: String },
    StartPolling { job_id: JobId },
    StopPolling,
    CheckActiveJobCount,
}
