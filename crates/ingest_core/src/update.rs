use crate::{
    map_status, Effect, ErrorCode, IngestStatus, JobDetails, Msg, ProgressInfo, SessionPhase,
    SessionRules, SessionState,
};

pub const INVALID_URL_MESSAGE: &str = "Paste a link to a TikTok, Instagram or YouTube video.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(
    mut state: SessionState,
    msg: Msg,
    rules: &SessionRules,
) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::ValidateUrl(url) => {
            state.is_valid_url = rules.pattern().matches(&url);
            Vec::new()
        }
        Msg::Submit(url) => {
            // One job at a time: a second submission is dropped, not queued.
            if state.is_loading {
                return (state, Vec::new());
            }
            // Any attempt, accepted or not, replaces what the last job left behind.
            state.reset_job();
            state.phase = SessionPhase::Idle;
            state.is_valid_url = rules.pattern().matches(&url);
            if !state.is_valid_url {
                state.error_message = Some(INVALID_URL_MESSAGE.to_string());
                return (state, Vec::new());
            }
            if state.is_job_limit_reached {
                state.error_message = Some(job_limit_message(state.active_job_count));
                return (state, Vec::new());
            }

            state.submission = state.submission.wrapping_add(1);
            state.phase = SessionPhase::Submitting;
            state.is_loading = true;
            vec![Effect::StartIngest {
                submission: state.submission,
                url: url.trim().to_string(),
            }]
        }
        Msg::SubmitSucceeded { submission, handle } => {
            if !state.is_awaiting_submission(submission) {
                return (state, Vec::new());
            }
            state.job_id = Some(handle.job_id.clone());
            state.clear_error();
            state.phase = SessionPhase::Polling;
            state.is_polling = true;

            let details = JobDetails::new(handle.job_id.clone(), handle.status);
            let effects = apply_job_details(&mut state, details, rules);
            if handle.status.is_terminal() {
                effects
            } else {
                vec![
                    Effect::StartPolling {
                        job_id: handle.job_id,
                    },
                    Effect::CheckActiveJobCount,
                ]
            }
        }
        Msg::SubmitFailed {
            submission,
            message,
        } => {
            if !state.is_awaiting_submission(submission) {
                return (state, Vec::new());
            }
            state.phase = SessionPhase::Idle;
            state.stop_tracking();
            state.clear_error();
            state.error_message = Some(message);
            Vec::new()
        }
        Msg::JobPolled(details) => {
            // Stale results for a superseded or cancelled job are discarded.
            if !state.is_tracking(&details.job_id) {
                return (state, Vec::new());
            }
            apply_job_details(&mut state, details, rules)
        }
        Msg::PollTick { job_id, poll_count } => {
            if state.is_tracking(&job_id) {
                state.poll_count = poll_count;
            }
            Vec::new()
        }
        Msg::ActiveJobCountLoaded(count) => {
            state.active_job_count = count;
            state.is_job_limit_reached = count >= rules.job_limit();
            Vec::new()
        }
        Msg::ActiveJobCountUnavailable => {
            // Fail open: a degraded count service must not block submissions.
            state.active_job_count = 0;
            state.is_job_limit_reached = false;
            Vec::new()
        }
        Msg::Retry => {
            let Some(job_id) = state.job_id.clone() else {
                return (state, Vec::new());
            };
            if state.phase != SessionPhase::Failed || !state.can_retry {
                return (state, Vec::new());
            }
            state.clear_error();
            // The failed step no longer applies; the next poll repaints progress.
            state.progress = ProgressInfo::idle();
            state.phase = SessionPhase::Polling;
            state.is_polling = true;
            state.is_loading = true;
            state.poll_count = 0;
            vec![Effect::StartPolling { job_id }]
        }
        Msg::Cancel => match state.phase {
            SessionPhase::Submitting | SessionPhase::Polling => {
                let was_polling = state.is_polling;
                state.phase = SessionPhase::Idle;
                state.stop_tracking();
                if was_polling {
                    vec![Effect::StopPolling]
                } else {
                    Vec::new()
                }
            }
            SessionPhase::Idle | SessionPhase::Completed | SessionPhase::Failed => Vec::new(),
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_job_details(
    state: &mut SessionState,
    details: JobDetails,
    rules: &SessionRules,
) -> Vec<Effect> {
    let progress = map_status(details.status);

    // Keep the visible step non-decreasing while the job is in flight.
    let in_flight = state.job_status.is_some_and(|status| !status.is_terminal());
    if !details.status.is_terminal() && in_flight && progress.step < state.progress.step {
        return Vec::new();
    }

    state.job_status = Some(details.status);
    state.progress = progress;

    match details.status {
        IngestStatus::Completed => {
            state.phase = SessionPhase::Completed;
            state.recipe_id = details.recipe_id;
            state.stop_tracking();
            vec![Effect::StopPolling, Effect::CheckActiveJobCount]
        }
        IngestStatus::Failed => {
            let code = details.error_code.unwrap_or(ErrorCode::Unknown);
            let classifier = rules.classifier();
            let message = classifier.message(code);

            state.phase = SessionPhase::Failed;
            state.progress.description = message.clone();
            state.error_message = Some(message);
            state.error_code = Some(code);
            state.can_retry = classifier.is_recoverable(code);
            state.retry_label = if state.can_retry {
                classifier.retry_label(code)
            } else {
                None
            };
            state.stop_tracking();
            vec![Effect::StopPolling, Effect::CheckActiveJobCount]
        }
        IngestStatus::Queued
        | IngestStatus::Downloading
        | IngestStatus::Extracting
        | IngestStatus::Transcribing
        | IngestStatus::DraftTranscribed
        | IngestStatus::Ocring
        | IngestStatus::OcrDone
        | IngestStatus::LlmRefining
        | IngestStatus::DraftParsed
        | IngestStatus::DraftParsedWithErrors => Vec::new(),
    }
}

fn job_limit_message(active: u32) -> String {
    format!(
        "You already have {active} imports in progress. Wait for one to finish before adding another."
    )
}
