//! Ingest engine: job repository seam, HTTP adapter and the polling session runtime.
mod http;
mod registry;
mod repository;
mod session;
mod types;

pub use http::{HttpJobRepository, HttpSettings};
pub use registry::SessionRegistry;
pub use repository::JobRepository;
pub use session::IngestSession;
pub use types::{HttpFailure, RepositoryError};
