use std::sync::{Arc, Mutex, PoisonError};

use ingest_core::{ConfigError, ErrorClassifier, SessionConfig};
use ingest_logging::ingest_info;

use crate::session::SessionSlot;
use crate::{IngestSession, JobRepository};

/// Hands every screen the same in-flight session.
///
/// The registry is an owned value: the app creates one and passes it to
/// whoever needs the ingest flow. Dropping it tears the held session down.
pub struct SessionRegistry {
    repository: Arc<dyn JobRepository>,
    classifier: Arc<dyn ErrorClassifier>,
    config: SessionConfig,
    slot: Arc<SessionSlot>,
}

impl SessionRegistry {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        classifier: Arc<dyn ErrorClassifier>,
        config: SessionConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            repository,
            classifier,
            config,
            slot: Arc::new(Mutex::new(None)),
        })
    }

    /// Returns the live session, creating it if needed.
    ///
    /// A new session immediately refreshes the active-job count so the
    /// limit reflects the server before the user submits. Must be called
    /// from within a Tokio runtime.
    pub fn get_or_create(&self) -> IngestSession {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.as_ref() {
            return session.clone();
        }

        let session = IngestSession::build(
            Arc::clone(&self.repository),
            Arc::clone(&self.classifier),
            self.config.clone(),
            Some(Arc::downgrade(&self.slot)),
        );
        *slot = Some(session.clone());
        drop(slot);

        ingest_info!("Ingest session created");
        session.spawn_active_job_count_check();
        session
    }

    /// The live session, if any, without creating one.
    pub fn current(&self) -> Option<IngestSession> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Disposes the live session and forgets it.
    pub fn clear(&self) {
        let held = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = held {
            session.dispose();
        }
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
