use std::sync::Arc;

use crate::{ErrorClassifier, ErrorTable, SessionConfig, UrlPattern};

/// The configuration-derived inputs `update` consults.
#[derive(Clone)]
pub struct SessionRules {
    pattern: UrlPattern,
    job_limit: u32,
    classifier: Arc<dyn ErrorClassifier>,
}

impl SessionRules {
    pub fn new(config: &SessionConfig, classifier: Arc<dyn ErrorClassifier>) -> Self {
        Self {
            pattern: UrlPattern::new(&config.allowed_hosts),
            job_limit: config.max_active_jobs,
            classifier,
        }
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub fn job_limit(&self) -> u32 {
        self.job_limit
    }

    pub fn classifier(&self) -> &dyn ErrorClassifier {
        self.classifier.as_ref()
    }
}

impl Default for SessionRules {
    fn default() -> Self {
        Self::new(&SessionConfig::default(), Arc::new(ErrorTable))
    }
}

impl std::fmt::Debug for SessionRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRules")
            .field("pattern", &self.pattern)
            .field("job_limit", &self.job_limit)
            .finish_non_exhaustive()
    }
}
