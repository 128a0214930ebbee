use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{ApplicationId, ApplicationStatus, Job, JobApplication, JobId, UserId};
use super::search::{select_jobs, JobSearchFilters, Page, PageRequest};
use super::store::{Acceptance, JobStore, StoreError};

#[derive(Debug, Default)]
struct Records {
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, JobApplication>,
}

/// Process-local [`JobStore`]; a single lock makes every guarded write atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryJobStore {
    records: Arc<Mutex<Records>>,
}

impl InMemoryJobStore {
    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.records.lock() {
            guard
                .jobs
                .extend(jobs.into_iter().map(|job| (job.id.clone(), job)));
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("job store lock poisoned".to_string()))
    }
}

fn by_submission_time(applications: &mut [JobApplication]) {
    applications.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl JobStore for InMemoryJobStore {
    fn create(&self, job: Job) -> Result<Job, StoreError> {
        let mut guard = self.lock()?;
        if guard.jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        guard.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.lock()?.jobs.get(id).cloned())
    }

    fn update(&self, mut job: Job, expected_version: u64) -> Result<Job, StoreError> {
        let mut guard = self.lock()?;
        let stored = guard.jobs.get_mut(&job.id).ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict);
        }
        job.version = expected_version + 1;
        *stored = job.clone();
        Ok(job)
    }

    fn delete(&self, id: &JobId) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.jobs.remove(id).ok_or(StoreError::NotFound)?;
        guard
            .applications
            .retain(|_, application| &application.job_id != id);
        Ok(())
    }

    fn query(
        &self,
        filters: &JobSearchFilters,
        request: PageRequest,
    ) -> Result<Page<Job>, StoreError> {
        let guard = self.lock()?;
        Ok(select_jobs(guard.jobs.values(), filters, request))
    }

    fn count_applications(
        &self,
        job_id: &JobId,
        statuses: &[ApplicationStatus],
    ) -> Result<usize, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .applications
            .values()
            .filter(|application| &application.job_id == job_id)
            .filter(|application| statuses.contains(&application.status))
            .count())
    }

    fn insert_application(
        &self,
        application: JobApplication,
        capacity: Option<u32>,
    ) -> Result<JobApplication, StoreError> {
        let mut guard = self.lock()?;
        if !guard.jobs.contains_key(&application.job_id) {
            return Err(StoreError::NotFound);
        }

        let mut holding = 0usize;
        for existing in guard
            .applications
            .values()
            .filter(|existing| existing.job_id == application.job_id)
        {
            if existing.applicant_id == application.applicant_id
                && existing.status.blocks_resubmission()
            {
                return Err(StoreError::Duplicate);
            }
            if existing.status.holds_capacity() {
                holding += 1;
            }
        }
        if let Some(limit) = capacity {
            if holding >= limit as usize {
                return Err(StoreError::CapacityReached { limit });
            }
        }

        guard
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn get_application(&self, id: &ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn update_application(
        &self,
        mut application: JobApplication,
        expected_version: u64,
    ) -> Result<JobApplication, StoreError> {
        let mut guard = self.lock()?;
        let stored = guard
            .applications
            .get_mut(&application.id)
            .ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict);
        }
        application.version = expected_version + 1;
        *stored = application.clone();
        Ok(application)
    }

    fn accept_application(
        &self,
        acceptance: Acceptance,
    ) -> Result<(JobApplication, Job), StoreError> {
        let Acceptance {
            mut application,
            application_version,
            mut job,
            job_version,
        } = acceptance;

        let mut guard = self.lock()?;
        let stored_job = guard.jobs.get(&job.id).ok_or(StoreError::NotFound)?;
        if stored_job.version != job_version || stored_job.assigned_worker_id.is_some() {
            return Err(StoreError::Conflict);
        }
        let stored_application = guard
            .applications
            .get(&application.id)
            .ok_or(StoreError::NotFound)?;
        if stored_application.version != application_version {
            return Err(StoreError::Conflict);
        }

        application.version = application_version + 1;
        job.version = job_version + 1;
        guard
            .applications
            .insert(application.id.clone(), application.clone());
        guard.jobs.insert(job.id.clone(), job.clone());
        Ok((application, job))
    }

    fn list_applications(&self, job_id: &JobId) -> Result<Vec<JobApplication>, StoreError> {
        let guard = self.lock()?;
        let mut applications: Vec<JobApplication> = guard
            .applications
            .values()
            .filter(|application| &application.job_id == job_id)
            .cloned()
            .collect();
        by_submission_time(&mut applications);
        Ok(applications)
    }

    fn applications_for(&self, applicant: &UserId) -> Result<Vec<JobApplication>, StoreError> {
        let guard = self.lock()?;
        let mut applications: Vec<JobApplication> = guard
            .applications
            .values()
            .filter(|application| &application.applicant_id == applicant)
            .cloned()
            .collect();
        by_submission_time(&mut applications);
        Ok(applications)
    }
}
