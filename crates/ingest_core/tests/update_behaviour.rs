use std::sync::Once;

use ingest_core::{
    update, Effect, ErrorCode, IngestStatus, JobDetails, JobHandle, Msg, SessionPhase,
    SessionRules, SessionState, INVALID_URL_MESSAGE,
};

const VIDEO_URL: &str = "https://www.tiktok.com/@chef/video/1";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ingest_logging::initialize_for_tests);
}

fn step(state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    update(state, msg, &SessionRules::default())
}

fn accept(state: SessionState, job_id: &str) -> (SessionState, Vec<Effect>) {
    let submission = state.submission;
    step(
        state,
        Msg::SubmitSucceeded {
            submission,
            handle: JobHandle {
                job_id: job_id.to_string(),
                status: IngestStatus::Queued,
            },
        },
    )
}

fn submitted(job_id: &str) -> SessionState {
    let (state, _) = step(SessionState::new(), Msg::Submit(VIDEO_URL.to_string()));
    accept(state, job_id).0
}

fn failed_with(code: ErrorCode) -> SessionState {
    let (state, _) = step(submitted("j1"), Msg::JobPolled(JobDetails::failed("j1", code)));
    state
}

#[test]
fn validate_url_only_touches_validity() {
    init_logging();
    let (state, effects) = step(SessionState::new(), Msg::ValidateUrl(VIDEO_URL.to_string()));
    assert!(state.is_valid_url);
    assert!(effects.is_empty());
    assert_eq!(state.phase, SessionPhase::Idle);

    let (state, _) = step(state, Msg::ValidateUrl("not a link".to_string()));
    assert!(!state.is_valid_url);
    assert_eq!(state.error_message, None);
}

#[test]
fn submit_trims_url_and_requests_ingest() {
    init_logging();
    let (state, effects) = step(
        SessionState::new(),
        Msg::Submit(format!("  {VIDEO_URL}\n")),
    );

    assert_eq!(state.phase, SessionPhase::Submitting);
    assert!(state.is_loading);
    assert!(!state.is_polling);
    assert_eq!(
        effects,
        vec![Effect::StartIngest {
            submission: 1,
            url: VIDEO_URL.to_string()
        }]
    );
}

#[test]
fn submit_with_invalid_url_starts_nothing() {
    init_logging();
    let (state, effects) = step(
        SessionState::new(),
        Msg::Submit("https://example.com/x".to_string()),
    );

    assert!(effects.is_empty());
    assert!(!state.is_loading);
    assert!(!state.is_valid_url);
    assert_eq!(state.error_message.as_deref(), Some(INVALID_URL_MESSAGE));
}

#[test]
fn submit_while_loading_is_a_noop() {
    init_logging();
    let (state, _) = step(submitted("j1"), Msg::PollTick {
        job_id: "j1".to_string(),
        poll_count: 4,
    });
    let before = state.clone();

    let (after, effects) = step(state, Msg::Submit(VIDEO_URL.to_string()));
    assert_eq!(after, before);
    assert_eq!(after.poll_count, 4);
    assert!(effects.is_empty());
}

#[test]
fn submit_success_starts_polling_and_checks_capacity() {
    init_logging();
    let (state, _) = step(SessionState::new(), Msg::Submit(VIDEO_URL.to_string()));
    let (state, effects) = accept(state, "j1");

    assert_eq!(state.phase, SessionPhase::Polling);
    assert_eq!(state.job_id.as_deref(), Some("j1"));
    assert_eq!(state.job_status, Some(IngestStatus::Queued));
    assert_eq!(state.progress.step, 1);
    assert!(state.is_polling);
    assert!(state.is_loading);
    assert_eq!(
        effects,
        vec![
            Effect::StartPolling {
                job_id: "j1".to_string()
            },
            Effect::CheckActiveJobCount,
        ]
    );
}

#[test]
fn submit_failure_surfaces_raw_error_without_polling() {
    init_logging();
    let (state, _) = step(SessionState::new(), Msg::Submit(VIDEO_URL.to_string()));
    let submission = state.submission;
    let (state, effects) = step(
        state,
        Msg::SubmitFailed {
            submission,
            message: "http status 503".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase, SessionPhase::Idle);
    assert!(!state.is_loading);
    assert!(!state.is_polling);
    assert_eq!(state.job_id, None);
    assert_eq!(state.error_message.as_deref(), Some("http status 503"));
    assert!(!state.can_retry);
}

#[test]
fn job_limit_blocks_submission() {
    init_logging();
    let (state, _) = step(SessionState::new(), Msg::ActiveJobCountLoaded(3));
    assert!(state.is_job_limit_reached);

    let (state, effects) = step(state, Msg::Submit(VIDEO_URL.to_string()));
    assert!(effects.is_empty());
    assert!(!state.is_loading);
    assert!(state
        .error_message
        .as_deref()
        .is_some_and(|message| message.contains('3')));
}

#[test]
fn unavailable_job_count_fails_open() {
    init_logging();
    let (state, _) = step(SessionState::new(), Msg::ActiveJobCountLoaded(5));
    let (state, _) = step(state, Msg::ActiveJobCountUnavailable);

    assert_eq!(state.active_job_count, 0);
    assert!(!state.is_job_limit_reached);

    let (_, effects) = step(state, Msg::Submit(VIDEO_URL.to_string()));
    assert_eq!(effects.len(), 1);
}

#[test]
fn cancel_stops_polling_but_keeps_status() {
    init_logging();
    let (state, _) = step(
        submitted("j1"),
        Msg::JobPolled(JobDetails::new("j1", IngestStatus::Transcribing)),
    );
    let (state, effects) = step(state, Msg::Cancel);

    assert_eq!(effects, vec![Effect::StopPolling]);
    assert!(!state.is_polling);
    assert!(!state.is_loading);
    assert_eq!(state.job_status, Some(IngestStatus::Transcribing));
    assert_eq!(state.progress.step, 4);

    // A poll that was in flight when the user left changes nothing.
    let before = state.clone();
    let (after, effects) = step(
        state,
        Msg::JobPolled(JobDetails::new("j1", IngestStatus::OcrDone)),
    );
    assert_eq!(after, before);
    assert!(effects.is_empty());
}

#[test]
fn cancel_on_terminal_job_is_a_noop() {
    init_logging();
    let state = failed_with(ErrorCode::Download);
    let (after, effects) = step(state.clone(), Msg::Cancel);
    assert_eq!(after, state);
    assert!(effects.is_empty());
}

#[test]
fn retry_resumes_polling_same_job() {
    init_logging();
    let state = failed_with(ErrorCode::Download);
    assert!(state.can_retry);
    assert_eq!(state.retry_label.as_deref(), Some("Try again"));

    let (state, effects) = step(state, Msg::Retry);
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            job_id: "j1".to_string()
        }]
    );
    assert_eq!(state.phase, SessionPhase::Polling);
    assert_eq!(state.job_id.as_deref(), Some("j1"));
    assert!(state.is_polling);
    assert_eq!(state.error_message, None);
    assert_eq!(state.error_code, None);
    assert!(!state.progress.has_error);
}

#[test]
fn retry_is_rejected_for_terminal_failures() {
    init_logging();
    let state = failed_with(ErrorCode::UnsupportedUrl);
    assert!(!state.can_retry);
    assert_eq!(state.retry_label, None);

    let (after, effects) = step(state.clone(), Msg::Retry);
    assert_eq!(after, state);
    assert!(effects.is_empty());
}

#[test]
fn retry_without_failure_is_a_noop() {
    init_logging();
    let state = submitted("j1");
    let (after, effects) = step(state.clone(), Msg::Retry);
    assert_eq!(after, state);
    assert!(effects.is_empty());
}

#[test]
fn new_submission_after_completion_resets_job_fields() {
    init_logging();
    let (state, _) = step(
        submitted("j1"),
        Msg::JobPolled(JobDetails::completed("j1", "recipe-9")),
    );
    assert_eq!(state.recipe_id.as_deref(), Some("recipe-9"));

    let (state, effects) = step(state, Msg::Submit(VIDEO_URL.to_string()));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.phase, SessionPhase::Submitting);
    assert_eq!(state.job_id, None);
    assert_eq!(state.job_status, None);
    assert_eq!(state.recipe_id, None);
    assert_eq!(state.progress.step, 0);
}

#[test]
fn answer_to_a_cancelled_submission_is_ignored_after_resubmit() {
    init_logging();
    let (state, _) = step(SessionState::new(), Msg::Submit(VIDEO_URL.to_string()));
    let first = state.submission;
    let (state, _) = step(state, Msg::Cancel);
    let (state, effects) = step(state, Msg::Submit(VIDEO_URL.to_string()));
    let second = state.submission;
    assert_ne!(first, second);
    assert_eq!(
        effects,
        vec![Effect::StartIngest {
            submission: second,
            url: VIDEO_URL.to_string()
        }]
    );

    let before = state.clone();
    let (state, effects) = step(
        state,
        Msg::SubmitSucceeded {
            submission: first,
            handle: JobHandle {
                job_id: "old".to_string(),
                status: IngestStatus::Queued,
            },
        },
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());

    let (state, _) = step(
        state,
        Msg::SubmitFailed {
            submission: first,
            message: "late".to_string(),
        },
    );
    assert_eq!(state, before);

    let (state, _) = accept(state, "new");
    assert_eq!(state.job_id.as_deref(), Some("new"));
    assert!(state.is_tracking("new"));
}

#[test]
fn rejected_submit_clears_the_previous_failure() {
    init_logging();
    let state = failed_with(ErrorCode::RateLimited);
    assert_eq!(state.retry_label.as_deref(), Some("Try again later"));

    let (state, effects) = step(state, Msg::Submit("https://example.com/x".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.phase, SessionPhase::Idle);
    assert_eq!(state.error_message.as_deref(), Some(INVALID_URL_MESSAGE));
    assert_eq!(state.error_code, None);
    assert!(!state.can_retry);
    assert_eq!(state.retry_label, None);
    assert_eq!(state.job_status, None);
    assert!(!state.progress.has_error);

    // Nothing left to retry.
    let (after, effects) = step(state.clone(), Msg::Retry);
    assert_eq!(after, state);
    assert!(effects.is_empty());
}
