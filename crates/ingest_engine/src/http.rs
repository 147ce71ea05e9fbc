use std::time::Duration;

use ingest_core::{JobDetails, JobHandle};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{HttpFailure, JobRepository, RepositoryError};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Root of the ingestion API, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ActiveCount {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `JobRepository` over the ingestion service's JSON API.
///
/// - `POST {base}/ingest` with `{"url": ...}` answers `{"jobId", "status"}`
/// - `GET {base}/ingest/{jobId}` answers a `JobDetails` payload
/// - `GET {base}/ingest/active` answers `{"count": n}`
#[derive(Debug, Clone)]
pub struct HttpJobRepository {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpJobRepository {
    pub fn new(settings: HttpSettings) -> Result<Self, RepositoryError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| RepositoryError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::InvalidUrl(format!(
                "{} cannot be used as an API root",
                settings.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RepositoryError::Network(err.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RepositoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RepositoryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl JobRepository for HttpJobRepository {
    async fn start_ingest(&self, url: &str) -> Result<JobHandle, RepositoryError> {
        let response = self
            .client
            .post(self.endpoint(&["ingest"])?)
            .json(&StartRequest { url })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobDetails, RepositoryError> {
        let response = self
            .client
            .get(self.endpoint(&["ingest", job_id])?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn active_job_count(&self) -> Result<u32, RepositoryError> {
        let response = self
            .client
            .get(self.endpoint(&["ingest", "active"])?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ActiveCount = read_json(response).await?;
        Ok(body.count)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
    let status = response.status();
    if !status.is_success() {
        // The body is best effort; the status alone is enough to fail.
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty());
        return Err(RepositoryError::HttpStatus(HttpFailure {
            status: status.as_u16(),
            message,
        }));
    }

    response.json::<T>().await.map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> RepositoryError {
    if err.is_timeout() {
        return RepositoryError::Timeout;
    }
    if err.is_decode() {
        return RepositoryError::Decode(err.to_string());
    }
    RepositoryError::Network(err.to_string())
}
