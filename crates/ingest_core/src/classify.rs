use crate::ErrorCode;

/// Lookup from a failure code to user messaging and retry eligibility.
pub trait ErrorClassifier: Send + Sync {
    fn message(&self, code: ErrorCode) -> String;
    fn is_recoverable(&self, code: ErrorCode) -> bool;
    fn retry_label(&self, code: ErrorCode) -> Option<String>;
}

/// Built-in classification table used when the host app supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTable;

struct Entry {
    message: &'static str,
    recoverable: bool,
    retry_label: Option<&'static str>,
}

impl ErrorTable {
    fn entry(code: ErrorCode) -> Entry {
        match code {
            ErrorCode::UnsupportedUrl => Entry {
                message: "This link isn't supported. Try a TikTok, Instagram or YouTube video.",
                recoverable: false,
                retry_label: None,
            },
            ErrorCode::Download => Entry {
                message: "We couldn't download the video. It may be private or removed.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Extract => Entry {
                message: "We couldn't read the video file.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Transcribe => Entry {
                message: "We couldn't make out the narration in this video.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Ocr => Entry {
                message: "We couldn't read the on-screen text.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Llm => Entry {
                message: "We couldn't turn this video into a recipe.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::RateLimited => Entry {
                message: "Too many imports right now. Please wait a moment.",
                recoverable: true,
                retry_label: Some("Try again later"),
            },
            ErrorCode::Timeout => Entry {
                message: "The import took too long.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Internal => Entry {
                message: "Something went wrong on our side.",
                recoverable: true,
                retry_label: Some("Try again"),
            },
            ErrorCode::Unknown => Entry {
                message: "The import failed for an unknown reason.",
                recoverable: false,
                retry_label: None,
            },
        }
    }
}

impl ErrorClassifier for ErrorTable {
    fn message(&self, code: ErrorCode) -> String {
        Self::entry(code).message.to_owned()
    }

    fn is_recoverable(&self, code: ErrorCode) -> bool {
        Self::entry(code).recoverable
    }

    fn retry_label(&self, code: ErrorCode) -> Option<String> {
        Self::entry(code).retry_label.map(str::to_owned)
    }
}
