use chrono::{DateTime, Local};
use ingest_core::{SessionPhase, SessionState};

/// One terminal line describing `state` at `now`.
pub fn status_line(state: &SessionState, now: DateTime<Local>) -> String {
    let progress = &state.progress;
    let mut line = format!(
        "[{}] {:>2}/{} {}",
        now.format("%H:%M:%S"),
        progress.step,
        progress.total_steps,
        progress.title
    );
    if !progress.description.is_empty() {
        line.push_str(" - ");
        line.push_str(&progress.description);
    }
    if state.is_polling && state.poll_count > 0 {
        line.push_str(&format!(" (poll {})", state.poll_count));
    }
    if state.phase == SessionPhase::Failed {
        if let Some(label) = &state.retry_label {
            line.push_str(&format!(" [{label}]"));
        }
    }
    line
}

/// Summary printed once the session settles.
pub fn outcome(state: &SessionState) -> String {
    match state.phase {
        SessionPhase::Completed => match &state.recipe_id {
            Some(recipe_id) => format!("Recipe added: {recipe_id}"),
            None => "Recipe added".to_string(),
        },
        SessionPhase::Failed => format!(
            "Import failed: {}",
            state.error_message.as_deref().unwrap_or("unknown error")
        ),
        SessionPhase::Idle | SessionPhase::Submitting | SessionPhase::Polling => state
            .error_message
            .clone()
            .unwrap_or_else(|| "Import stopped".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ingest_core::{map_status, ErrorCode, IngestStatus};

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn polling_line_shows_step_and_poll_count() {
        let mut state = SessionState::new();
        state.phase = SessionPhase::Polling;
        state.is_polling = true;
        state.poll_count = 3;
        state.progress = map_status(IngestStatus::Downloading);

        let line = status_line(&state, at_noon());
        assert!(line.starts_with("[12:00:00]"), "{line}");
        assert!(line.contains("/10"), "{line}");
        assert!(line.ends_with("(poll 3)"), "{line}");
    }

    #[test]
    fn failed_line_carries_retry_label() {
        let mut state = SessionState::new();
        state.phase = SessionPhase::Failed;
        state.progress = map_status(IngestStatus::Failed);
        state.progress.description = "Download failed".to_string();
        state.error_message = Some("Download failed".to_string());
        state.error_code = Some(ErrorCode::Download);
        state.retry_label = Some("Try again".to_string());

        let line = status_line(&state, at_noon());
        assert!(line.contains(" 0/10 Import failed - Download failed"), "{line}");
        assert!(line.ends_with("[Try again]"), "{line}");
        assert_eq!(outcome(&state), "Import failed: Download failed");
    }

    #[test]
    fn completed_outcome_names_recipe() {
        let mut state = SessionState::new();
        state.phase = SessionPhase::Completed;
        state.recipe_id = Some("r-42".to_string());
        assert_eq!(outcome(&state), "Recipe added: r-42");
    }
}
