use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use rigger::marketplace::{EventPublisher, InMemoryJobStore, MarketplaceEvent, PublishError};
use rigger::seed::{JobSeedImporter, SeedImportError};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes every marketplace event to the log until a broadcast transport is
/// wired in.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingEventPublisher;

impl EventPublisher for LoggingEventPublisher {
    fn publish(&self, event: MarketplaceEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&event)
            .map_err(|err| PublishError::Transport(err.to_string()))?;
        info!(event = event.name(), %payload, "marketplace event");
        Ok(())
    }
}

pub(crate) fn seeded_store(seed: Option<&Path>) -> Result<InMemoryJobStore, SeedImportError> {
    let Some(path) = seed else {
        return Ok(InMemoryJobStore::default());
    };

    let jobs = JobSeedImporter::from_path(path, Utc::now())?;
    info!(path = %path.display(), jobs = jobs.len(), "loaded job seed");
    Ok(InMemoryJobStore::with_jobs(jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigger::marketplace::{JobId, JobStore};

    #[test]
    fn logging_publisher_accepts_every_event() {
        let event = MarketplaceEvent::JobDeleted {
            job_id: JobId("job-1".to_string()),
        };
        assert!(LoggingEventPublisher.publish(event).is_ok());
    }

    #[test]
    fn missing_seed_means_empty_store() {
        let store = seeded_store(None).expect("empty store");
        assert!(store
            .get(&JobId("job-1".to_string()))
            .expect("store available")
            .is_none());
    }

    #[test]
    fn unreadable_seed_is_an_error() {
        let error = seeded_store(Some(Path::new("./missing-jobs.csv"))).expect_err("io error");
        assert!(matches!(error, SeedImportError::Io(_)));
    }
}
