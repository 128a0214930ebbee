use super::domain::{ApplicationId, ApplicationStatus, Job, JobApplication, JobId, UserId};
use super::search::{JobSearchFilters, Page, PageRequest};

/// Failures reported by a [`JobStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("an active application already exists for this applicant")]
    Duplicate,
    #[error("applicant limit of {limit} reached")]
    CapacityReached { limit: u32 },
    #[error("record changed since it was read")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Conditional write accepting an application and assigning its worker.
///
/// The store commits both records only if neither version moved and the
/// stored job has no assigned worker.
#[derive(Debug, Clone)]
pub struct Acceptance {
    pub application: JobApplication,
    pub application_version: u64,
    pub job: Job,
    pub job_version: u64,
}

/// Persistence boundary for jobs and applications.
///
/// Writes that guard shared state (`update`, `insert_application`,
/// `update_application`, `accept_application`) must be atomic conditional
/// writes; a stale `expected_version` yields [`StoreError::Conflict`].
pub trait JobStore: Send + Sync {
    fn create(&self, job: Job) -> Result<Job, StoreError>;
    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    fn update(&self, job: Job, expected_version: u64) -> Result<Job, StoreError>;
    /// Removes the job together with its applications.
    fn delete(&self, id: &JobId) -> Result<(), StoreError>;
    fn query(&self, filters: &JobSearchFilters, request: PageRequest)
        -> Result<Page<Job>, StoreError>;
    fn count_applications(
        &self,
        job_id: &JobId,
        statuses: &[ApplicationStatus],
    ) -> Result<usize, StoreError>;

    /// Inserts unless the applicant already holds a live application for the
    /// job or the job's capacity-holding applications have reached `capacity`.
    fn insert_application(
        &self,
        application: JobApplication,
        capacity: Option<u32>,
    ) -> Result<JobApplication, StoreError>;
    fn get_application(&self, id: &ApplicationId) -> Result<Option<JobApplication>, StoreError>;
    fn update_application(
        &self,
        application: JobApplication,
        expected_version: u64,
    ) -> Result<JobApplication, StoreError>;
    fn accept_application(&self, acceptance: Acceptance)
        -> Result<(JobApplication, Job), StoreError>;
    fn list_applications(&self, job_id: &JobId) -> Result<Vec<JobApplication>, StoreError>;
    fn applications_for(&self, applicant: &UserId) -> Result<Vec<JobApplication>, StoreError>;
}
