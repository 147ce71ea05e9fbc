use std::fmt;

use serde::{Deserialize, Serialize};

pub type JobId = String;

/// Pipeline stage reported by the ingestion service.
///
/// Declaration order follows the server pipeline, but the server is free to
/// jump straight to `Failed` from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestStatus {
    Queued,
    Downloading,
    Extracting,
    Transcribing,
    DraftTranscribed,
    Ocring,
    OcrDone,
    LlmRefining,
    DraftParsed,
    DraftParsedWithErrors,
    Completed,
    Failed,
}

impl IngestStatus {
    pub const ALL: [IngestStatus; 12] = [
        IngestStatus::Queued,
        IngestStatus::Downloading,
        IngestStatus::Extracting,
        IngestStatus::Transcribing,
        IngestStatus::DraftTranscribed,
        IngestStatus::Ocring,
        IngestStatus::OcrDone,
        IngestStatus::LlmRefining,
        IngestStatus::DraftParsed,
        IngestStatus::DraftParsedWithErrors,
        IngestStatus::Completed,
        IngestStatus::Failed,
    ];

    /// `Completed` and `Failed` never transition further.
    pub fn is_terminal(self) -> bool {
        matches!(self, IngestStatus::Completed | IngestStatus::Failed)
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            IngestStatus::Queued => "QUEUED",
            IngestStatus::Downloading => "DOWNLOADING",
            IngestStatus::Extracting => "EXTRACTING",
            IngestStatus::Transcribing => "TRANSCRIBING",
            IngestStatus::DraftTranscribed => "DRAFT_TRANSCRIBED",
            IngestStatus::Ocring => "OCRING",
            IngestStatus::OcrDone => "OCR_DONE",
            IngestStatus::LlmRefining => "LLM_REFINING",
            IngestStatus::DraftParsed => "DRAFT_PARSED",
            IngestStatus::DraftParsedWithErrors => "DRAFT_PARSED_WITH_ERRORS",
            IngestStatus::Completed => "COMPLETED",
            IngestStatus::Failed => "FAILED",
        };
        f.write_str(wire)
    }
}

/// Server-defined failure reason attached to a `FAILED` job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "E_UNSUPPORTED_URL")]
    UnsupportedUrl,
    #[serde(rename = "E_DOWNLOAD")]
    Download,
    #[serde(rename = "E_EXTRACT")]
    Extract,
    #[serde(rename = "E_TRANSCRIBE")]
    Transcribe,
    #[serde(rename = "E_OCR")]
    Ocr,
    #[serde(rename = "E_LLM")]
    Llm,
    #[serde(rename = "E_RATE_LIMITED")]
    RateLimited,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_INTERNAL")]
    Internal,
    /// Any code this client does not know about yet.
    #[serde(other, rename = "E_UNKNOWN")]
    Unknown,
}

/// Returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: JobId,
    pub status: IngestStatus,
}

/// One poll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    /// Empty when the server omitted it.
    #[serde(default)]
    pub job_id: JobId,
    pub status: IngestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
}

impl JobDetails {
    pub fn new(job_id: impl Into<JobId>, status: IngestStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            error_code: None,
            recipe_id: None,
        }
    }

    pub fn failed(job_id: impl Into<JobId>, code: ErrorCode) -> Self {
        Self {
            error_code: Some(code),
            ..Self::new(job_id, IngestStatus::Failed)
        }
    }

    pub fn completed(job_id: impl Into<JobId>, recipe_id: impl Into<String>) -> Self {
        Self {
            recipe_id: Some(recipe_id.into()),
            ..Self::new(job_id, IngestStatus::Completed)
        }
    }

    /// Back-fills the id of the polled job when the payload left it out.
    ///
    /// Some server builds drop `jobId` from status payloads; the poller
    /// always knows which job it asked about, so that id is authoritative.
    pub fn with_job_id_fallback(mut self, polled: &str) -> Self {
        if self.job_id.is_empty() {
            self.job_id = polled.to_owned();
        }
        self
    }
}
