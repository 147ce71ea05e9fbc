use serde::Serialize;

use crate::IngestStatus;

pub const TOTAL_STEPS: u8 = 10;

/// User-facing progress derived from a status. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    pub step: u8,
    pub total_steps: u8,
    pub title: String,
    pub description: String,
    pub is_complete: bool,
    pub has_error: bool,
}

impl ProgressInfo {
    /// Progress shown before any job has been submitted.
    pub fn idle() -> Self {
        Self {
            step: 0,
            total_steps: TOTAL_STEPS,
            title: String::new(),
            description: String::new(),
            is_complete: false,
            has_error: false,
        }
    }

    fn stage(step: u8, title: &str, description: &str) -> Self {
        Self {
            step,
            title: title.to_owned(),
            description: description.to_owned(),
            ..Self::idle()
        }
    }
}

impl Default for ProgressInfo {
    fn default() -> Self {
        Self::idle()
    }
}

/// Maps a pipeline status to its progress step and copy.
///
/// `Failed` only carries a generic title; the session overlays the
/// classifier's message on top of it.
pub fn map_status(status: IngestStatus) -> ProgressInfo {
    match status {
        IngestStatus::Queued => {
            ProgressInfo::stage(1, "Queued", "Waiting for a free worker to pick up the video.")
        }
        IngestStatus::Downloading => {
            ProgressInfo::stage(2, "Downloading", "Fetching the video from the source.")
        }
        IngestStatus::Extracting => ProgressInfo::stage(
            3,
            "Extracting",
            "Pulling the audio track and key frames out of the video.",
        ),
        IngestStatus::Transcribing => {
            ProgressInfo::stage(4, "Transcribing", "Turning the spoken instructions into text.")
        }
        IngestStatus::DraftTranscribed => ProgressInfo::stage(
            5,
            "Transcript ready",
            "The narration has been transcribed.",
        ),
        IngestStatus::Ocring => ProgressInfo::stage(
            6,
            "Reading on-screen text",
            "Scanning frames for ingredient lists and captions.",
        ),
        IngestStatus::OcrDone => ProgressInfo::stage(
            7,
            "On-screen text captured",
            "Captions and overlays have been read.",
        ),
        IngestStatus::LlmRefining => ProgressInfo::stage(
            8,
            "Writing the recipe",
            "Combining transcript and captions into ingredients and steps.",
        ),
        IngestStatus::DraftParsed => {
            ProgressInfo::stage(9, "Draft ready", "The recipe draft has been assembled.")
        }
        IngestStatus::DraftParsedWithErrors => ProgressInfo::stage(
            9,
            "Draft ready with warnings",
            "The draft was assembled but some parts may need a manual check.",
        ),
        IngestStatus::Completed => ProgressInfo {
            is_complete: true,
            ..ProgressInfo::stage(TOTAL_STEPS, "Recipe added", "Your recipe is ready to view.")
        },
        IngestStatus::Failed => ProgressInfo {
            has_error: true,
            ..ProgressInfo::stage(0, "Import failed", "Something went wrong while importing.")
        },
    }
}
