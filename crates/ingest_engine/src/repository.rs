use ingest_core::{JobDetails, JobHandle};

use crate::RepositoryError;

/// Network seam between the session and the ingestion service.
#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    async fn start_ingest(&self, url: &str) -> Result<JobHandle, RepositoryError>;

    async fn poll_job(&self, job_id: &str) -> Result<JobDetails, RepositoryError>;

    async fn active_job_count(&self) -> Result<u32, RepositoryError>;
}
