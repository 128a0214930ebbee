use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::domain::{
    Actor, Address, ApplicationId, ApplicationStatus, Coordinates, Job, JobApplication, JobId,
    JobStatus, JobType, PayType, UrgencyLevel, UserId, UserRole,
};
use crate::marketplace::events::{EventPublisher, MarketplaceEvent, PublishError};
use crate::marketplace::memory::InMemoryJobStore;
use crate::marketplace::search::{JobSearchFilters, Page, PageLimits, PageRequest};
use crate::marketplace::store::{Acceptance, JobStore, StoreError};
use crate::marketplace::validation::CreateJobRequest;
use crate::marketplace::{marketplace_router, MarketplaceService};

pub(super) const SYDNEY: Coordinates = Coordinates {
    latitude: -33.8688,
    longitude: 151.2093,
};
pub(super) const NEWCASTLE: Coordinates = Coordinates {
    latitude: -32.9283,
    longitude: 151.7817,
};
pub(super) const MELBOURNE: Coordinates = Coordinates {
    latitude: -37.8136,
    longitude: 144.9631,
};

pub(super) fn employer() -> Actor {
    Actor::new("emp-harbour", UserRole::Employer)
}

pub(super) fn other_employer() -> Actor {
    Actor::new("emp-westside", UserRole::Employer)
}

pub(super) fn worker(n: u32) -> Actor {
    Actor::new(format!("worker-{n}"), UserRole::Worker)
}

pub(super) fn safety_officer() -> Actor {
    Actor::new("safety-1", UserRole::SafetyOfficer)
}

pub(super) fn site(city: &str, state: &str, coordinates: Option<Coordinates>) -> Address {
    Address {
        street: "1 Hickson Rd".to_string(),
        suburb: "The Rocks".to_string(),
        city: city.to_string(),
        state: state.to_string(),
        postcode: "2000".to_string(),
        country: "Australia".to_string(),
        coordinates,
    }
}

/// Tower crane posting in Sydney paying 650 AUD per day.
pub(super) fn crane_request() -> CreateJobRequest {
    CreateJobRequest {
        title: "Tower crane operator".to_string(),
        description: "Operate a luffing tower crane on a 40 storey build".to_string(),
        company: "Harbour Lift Co".to_string(),
        requirements: vec!["5 years tower crane experience".to_string()],
        location: site("Sydney", "NSW", Some(SYDNEY)),
        job_type: JobType::CraneOperation,
        urgency_level: UrgencyLevel::High,
        estimated_duration: Some("3 months".to_string()),
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 9, 30),
        pay_type: PayType::Daily,
        pay_amount: Some(650.0),
        currency: Some("AUD".to_string()),
        safety_requirements: vec!["White card".to_string()],
        required_skill_ids: vec!["tower-crane".to_string()],
        required_certification_ids: vec!["hrwl-ct".to_string()],
        max_applicants: None,
        publish: true,
    }
}

pub(super) fn fixed_time(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

/// Stored job with a fixed creation time, for search tests that need
/// deterministic ordering.
pub(super) fn stored_job(id: &str, minutes: i64) -> Job {
    let created_at = fixed_time(minutes);
    Job {
        id: JobId(id.to_string()),
        title: format!("Rigger {id}"),
        description: "General rigging crew".to_string(),
        company: "Westside Rigging".to_string(),
        requirements: Vec::new(),
        location: site("Sydney", "NSW", Some(SYDNEY)),
        job_type: JobType::Rigging,
        urgency_level: UrgencyLevel::Medium,
        estimated_duration: None,
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1),
        end_date: None,
        pay_type: PayType::Hourly,
        pay_amount: Some(55.0),
        currency: "AUD".to_string(),
        safety_requirements: Vec::new(),
        required_skill_ids: Default::default(),
        required_certification_ids: Default::default(),
        status: JobStatus::Open,
        max_applicants: None,
        poster_id: UserId("emp-westside".to_string()),
        assigned_worker_id: None,
        created_at,
        updated_at: created_at,
        published_at: Some(created_at),
        completed_at: None,
        version: 0,
    }
}

pub(super) type TestService = MarketplaceService<InMemoryJobStore, MemoryEvents>;

pub(super) fn build_service() -> (TestService, Arc<InMemoryJobStore>, Arc<MemoryEvents>) {
    build_service_with(InMemoryJobStore::default())
}

pub(super) fn build_service_with(
    store: InMemoryJobStore,
) -> (TestService, Arc<InMemoryJobStore>, Arc<MemoryEvents>) {
    let store = Arc::new(store);
    let events = Arc::new(MemoryEvents::default());
    let service = MarketplaceService::new(store.clone(), events.clone(), PageLimits::default());
    (service, store, events)
}

pub(super) fn router_with_service<S, E>(service: MarketplaceService<S, E>) -> axum::Router
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    marketplace_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryEvents {
    events: Mutex<Vec<MarketplaceEvent>>,
}

impl MemoryEvents {
    pub(super) fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .iter()
            .map(MarketplaceEvent::name)
            .collect()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: MarketplaceEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflineEvents;

impl EventPublisher for OfflineEvents {
    fn publish(&self, _event: MarketplaceEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("socket hub offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl JobStore for UnavailableStore {
    fn create(&self, _job: Job) -> Result<Job, StoreError> {
        offline()
    }

    fn get(&self, _id: &JobId) -> Result<Option<Job>, StoreError> {
        offline()
    }

    fn update(&self, _job: Job, _expected_version: u64) -> Result<Job, StoreError> {
        offline()
    }

    fn delete(&self, _id: &JobId) -> Result<(), StoreError> {
        offline()
    }

    fn query(
        &self,
        _filters: &JobSearchFilters,
        _request: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        offline()
    }

    fn count_applications(
        &self,
        _job_id: &JobId,
        _statuses: &[ApplicationStatus],
    ) -> Result<usize, StoreError> {
        offline()
    }

    fn insert_application(
        &self,
        _application: JobApplication,
        _capacity: Option<u32>,
    ) -> Result<JobApplication, StoreError> {
        offline()
    }

    fn get_application(&self, _id: &ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        offline()
    }

    fn update_application(
        &self,
        _application: JobApplication,
        _expected_version: u64,
    ) -> Result<JobApplication, StoreError> {
        offline()
    }

    fn accept_application(
        &self,
        _acceptance: Acceptance,
    ) -> Result<(JobApplication, Job), StoreError> {
        offline()
    }

    fn list_applications(&self, _job_id: &JobId) -> Result<Vec<JobApplication>, StoreError> {
        offline()
    }

    fn applications_for(&self, _applicant: &UserId) -> Result<Vec<JobApplication>, StoreError> {
        offline()
    }
}

/// Memory store whose job disappears just before an acceptance commits.
#[derive(Default)]
pub(super) struct VanishingJobStore {
    pub(super) inner: InMemoryJobStore,
}

impl JobStore for VanishingJobStore {
    fn create(&self, job: Job) -> Result<Job, StoreError> {
        self.inner.create(job)
    }

    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        self.inner.get(id)
    }

    fn update(&self, job: Job, expected_version: u64) -> Result<Job, StoreError> {
        self.inner.update(job, expected_version)
    }

    fn delete(&self, id: &JobId) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn query(
        &self,
        filters: &JobSearchFilters,
        request: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        self.inner.query(filters, request)
    }

    fn count_applications(
        &self,
        job_id: &JobId,
        statuses: &[ApplicationStatus],
    ) -> Result<usize, StoreError> {
        self.inner.count_applications(job_id, statuses)
    }

    fn insert_application(
        &self,
        application: JobApplication,
        capacity: Option<u32>,
    ) -> Result<JobApplication, StoreError> {
        self.inner.insert_application(application, capacity)
    }

    fn get_application(&self, id: &ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        self.inner.get_application(id)
    }

    fn update_application(
        &self,
        application: JobApplication,
        expected_version: u64,
    ) -> Result<JobApplication, StoreError> {
        self.inner.update_application(application, expected_version)
    }

    fn accept_application(
        &self,
        acceptance: Acceptance,
    ) -> Result<(JobApplication, Job), StoreError> {
        self.inner.delete(&acceptance.job.id)?;
        self.inner.accept_application(acceptance)
    }

    fn list_applications(&self, job_id: &JobId) -> Result<Vec<JobApplication>, StoreError> {
        self.inner.list_applications(job_id)
    }

    fn applications_for(&self, applicant: &UserId) -> Result<Vec<JobApplication>, StoreError> {
        self.inner.applications_for(applicant)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn ids(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|job| job.id.0.as_str()).collect()
}

pub(super) fn within_newcastle() -> Address {
    site("Newcastle", "NSW", Some(NEWCASTLE))
}

pub(super) fn within_melbourne() -> Address {
    site("Melbourne", "VIC", Some(MELBOURNE))
}
