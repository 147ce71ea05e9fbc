//! Ingest core: status taxonomy, progress mapping and the pure session state machine.
mod classify;
mod config;
mod effect;
mod msg;
mod progress;
mod rules;
mod schedule;
mod state;
mod status;
mod update;
mod url_pattern;

pub use classify::{ErrorClassifier, ErrorTable};
pub use config::{ConfigError, SessionConfig};
pub use effect::Effect;
pub use msg::Msg;
pub use progress::{map_status, ProgressInfo, TOTAL_STEPS};
pub use rules::SessionRules;
pub use schedule::PollSchedule;
pub use state::{SessionPhase, SessionState};
pub use status::{ErrorCode, IngestStatus, JobDetails, JobHandle, JobId};
pub use update::{update, INVALID_URL_MESSAGE};
pub use url_pattern::UrlPattern;
