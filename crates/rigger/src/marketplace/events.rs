use serde::Serialize;

use super::domain::{ApplicationId, ApplicationStatus, JobId, JobStatus, UserId};

/// Side effects handed to the notification channel after a committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum MarketplaceEvent {
    #[serde(rename = "job:created", rename_all = "camelCase")]
    JobCreated { job_id: JobId, poster_id: UserId },
    #[serde(rename = "job:updated", rename_all = "camelCase")]
    JobUpdated { job_id: JobId, status: JobStatus },
    #[serde(rename = "job:deleted", rename_all = "camelCase")]
    JobDeleted { job_id: JobId },
    #[serde(rename = "job:application:received", rename_all = "camelCase")]
    ApplicationReceived {
        application_id: ApplicationId,
        job_id: JobId,
        applicant_id: UserId,
    },
    #[serde(rename = "job:application:status_changed", rename_all = "camelCase")]
    ApplicationStatusChanged {
        application_id: ApplicationId,
        job_id: JobId,
        status: ApplicationStatus,
    },
}

impl MarketplaceEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            MarketplaceEvent::JobCreated { .. } => "job:created",
            MarketplaceEvent::JobUpdated { .. } => "job:updated",
            MarketplaceEvent::JobDeleted { .. } => "job:deleted",
            MarketplaceEvent::ApplicationReceived { .. } => "job:application:received",
            MarketplaceEvent::ApplicationStatusChanged { .. } => "job:application:status_changed",
        }
    }
}

/// Outbound broadcast hook (websocket fan-out, e-mail, push).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: MarketplaceEvent) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_channel_names() {
        let event = MarketplaceEvent::ApplicationStatusChanged {
            application_id: ApplicationId("app-1".to_string()),
            job_id: JobId("job-1".to_string()),
            status: ApplicationStatus::Shortlisted,
        };

        let encoded = serde_json::to_value(&event).expect("serialize");
        assert_eq!(encoded["event"], "job:application:status_changed");
        assert_eq!(encoded["payload"]["applicationId"], "app-1");
        assert_eq!(encoded["payload"]["status"], "SHORTLISTED");
        assert_eq!(event.name(), "job:application:status_changed");
    }
}
