use crate::{JobDetails, JobHandle, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL field.
    ValidateUrl(String),
    /// User asked to import the URL.
    Submit(String),
    /// The repository accepted the submission tagged `submission`.
    SubmitSucceeded { submission: u64, handle: JobHandle },
    /// The repository rejected the submission or could not be reached.
    SubmitFailed { submission: u64, message: String },
    /// A poll returned, already normalized to carry the polled job id.
    JobPolled(JobDetails),
    /// The poll loop finished a wait.
    PollTick { job_id: JobId, poll_count: u32 },
    /// Active-job count service answered.
    ActiveJobCountLoaded(u32),
    /// Active-job count service failed.
    ActiveJobCountUnavailable,
    /// User asked to retry a failed job.
    Retry,
    /// User left an in-flight job.
    Cancel,
    NoOp,
}
