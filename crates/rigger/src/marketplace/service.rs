use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Actor, ApplicationId, ApplicationStatus, Job, JobApplication, JobId, JobStatus,
};
use super::error::MarketplaceError;
use super::events::{EventPublisher, MarketplaceEvent};
use super::lifecycle::InvalidTransition;
use super::policy::{authorize, Action, Ownership};
use super::search::{JobSearchFilters, JobSearchResult, JobSummary, PageLimits, PageRequest};
use super::store::{Acceptance, JobStore, StoreError};
use super::validation::{
    CreateApplicationRequest, CreateJobRequest, UpdateApplicationStatusRequest, UpdateJobRequest,
};

/// Result of an application status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTransition {
    pub application: JobApplication,
    /// The job after assignment, present only for acceptances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    /// Sibling applications left open after an acceptance; the employer
    /// decides what happens to them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub open_siblings: Vec<ApplicationId>,
}

/// Marketplace operations: posting, search, and the application workflow.
pub struct MarketplaceService<S, E> {
    store: Arc<S>,
    events: Arc<E>,
    limits: PageLimits,
}

impl<S, E> MarketplaceService<S, E>
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(store: Arc<S>, events: Arc<E>, limits: PageLimits) -> Self {
        Self {
            store,
            events,
            limits,
        }
    }

    pub fn page_limits(&self) -> PageLimits {
        self.limits
    }

    pub fn create_job(
        &self,
        actor: &Actor,
        request: CreateJobRequest,
    ) -> Result<Job, MarketplaceError> {
        ensure(actor, Action::CreateJob, Ownership::NONE)?;

        let job = request.into_job(actor.user_id.clone(), Utc::now())?;
        let job = self.store.create(job)?;
        info!(job_id = %job.id, poster = %job.poster_id, status = ?job.status, "job posted");

        self.emit(MarketplaceEvent::JobCreated {
            job_id: job.id.clone(),
            poster_id: job.poster_id.clone(),
        });
        Ok(job)
    }

    pub fn get_job(&self, id: &JobId) -> Result<Job, MarketplaceError> {
        self.load_job(id)
    }

    pub fn update_job(
        &self,
        actor: &Actor,
        id: &JobId,
        patch: UpdateJobRequest,
    ) -> Result<Job, MarketplaceError> {
        let mut job = self.load_job(id)?;
        ensure(
            actor,
            Action::UpdateJob,
            Ownership::poster(job.poster_id == actor.user_id),
        )?;

        let expected_version = job.version;
        let previous_status = job.status;
        patch.apply_to(&mut job, Utc::now())?;
        let next_status = job.status;

        let job = self
            .store
            .update(job, expected_version)
            .map_err(|error| {
                write_error(
                    error,
                    MarketplaceError::job_not_found(id),
                    InvalidTransition::job(previous_status, next_status)
                        .with_detail("job changed concurrently"),
                )
            })?;
        info!(job_id = %job.id, status = ?job.status, "job updated");

        self.emit(MarketplaceEvent::JobUpdated {
            job_id: job.id.clone(),
            status: job.status,
        });
        Ok(job)
    }

    /// Removes the job and, with it, every application against it.
    pub fn delete_job(&self, actor: &Actor, id: &JobId) -> Result<(), MarketplaceError> {
        let job = self.load_job(id)?;
        ensure(
            actor,
            Action::DeleteJob,
            Ownership::poster(job.poster_id == actor.user_id),
        )?;

        self.store
            .delete(id)
            .map_err(|error| missing_or(error, MarketplaceError::job_not_found(id)))?;
        info!(job_id = %id, "job deleted");

        self.emit(MarketplaceEvent::JobDeleted { job_id: id.clone() });
        Ok(())
    }

    pub fn search_jobs(
        &self,
        filters: &JobSearchFilters,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<JobSearchResult, MarketplaceError> {
        filters.validate()?;
        let request = PageRequest::clamped(page, limit, self.limits);
        let jobs = self.store.query(filters, request)?;
        debug!(total = jobs.total, page = jobs.page, "job search executed");

        let capacity_holding = ApplicationStatus::capacity_holding();
        let page = jobs.try_map(|job| {
            let count = self.store.count_applications(&job.id, &capacity_holding)?;
            Ok::<_, StoreError>(JobSummary::from_job(job, count))
        })?;
        Ok(page.into())
    }

    pub fn submit_application(
        &self,
        actor: &Actor,
        job_id: &JobId,
        request: CreateApplicationRequest,
    ) -> Result<JobApplication, MarketplaceError> {
        let job = self.load_job(job_id)?;
        ensure(
            actor,
            Action::SubmitApplication,
            Ownership::poster(job.poster_id == actor.user_id),
        )?;
        if !job.accepts_applications() {
            return Err(InvalidTransition::submission(job.status).into());
        }

        let application =
            request.into_application(job.id.clone(), actor.user_id.clone(), Utc::now())?;
        let application = self
            .store
            .insert_application(application, job.max_applicants)
            .map_err(|error| missing_or(error, MarketplaceError::job_not_found(job_id)))?;
        info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant = %application.applicant_id,
            "application received"
        );

        self.emit(MarketplaceEvent::ApplicationReceived {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            applicant_id: application.applicant_id.clone(),
        });
        Ok(application)
    }

    pub fn get_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
    ) -> Result<JobApplication, MarketplaceError> {
        let application = self.load_application(id)?;
        let job = self.load_job(&application.job_id)?;
        ensure(
            actor,
            Action::ViewApplication,
            Ownership {
                is_job_poster: job.poster_id == actor.user_id,
                is_applicant: application.applicant_id == actor.user_id,
            },
        )?;
        Ok(application)
    }

    /// Entry point for `PATCH /api/applications/:id`: withdrawals go to the
    /// applicant path, everything else is an employer decision.
    pub fn change_application_status(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        request: UpdateApplicationStatusRequest,
    ) -> Result<ApplicationTransition, MarketplaceError> {
        if request.status == ApplicationStatus::Withdrawn {
            let application = self.withdraw_application(actor, id)?;
            return Ok(ApplicationTransition {
                application,
                job: None,
                open_siblings: Vec::new(),
            });
        }
        self.review_application(actor, id, request.status, request.notes)
    }

    pub fn review_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
        next: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<ApplicationTransition, MarketplaceError> {
        let mut application = self.load_application(id)?;
        let job = self.load_job(&application.job_id)?;
        ensure(
            actor,
            Action::ReviewApplication,
            Ownership::poster(job.poster_id == actor.user_id),
        )?;

        let now = Utc::now();
        let previous = application.status;
        let application_version = application.version;
        application.record_decision(next, notes, now)?;

        if next != ApplicationStatus::Accepted {
            let application = self
                .store
                .update_application(application, application_version)
                .map_err(|error| {
                    write_error(
                        error,
                        MarketplaceError::application_not_found(id),
                        InvalidTransition::application(previous, next)
                            .with_detail("application changed concurrently"),
                    )
                })?;
            info!(application_id = %id, from = ?previous, to = ?next, "application reviewed");
            self.emit_status_change(&application);
            return Ok(ApplicationTransition {
                application,
                job: None,
                open_siblings: Vec::new(),
            });
        }

        let job_id = job.id.clone();
        let job_status = job.status;
        let job_version = job.version;
        let mut job = job;
        job.assign_worker(application.applicant_id.clone(), now)?;

        let (application, job) = self
            .store
            .accept_application(Acceptance {
                application,
                application_version,
                job,
                job_version,
            })
            .map_err(|error| {
                write_error(
                    error,
                    MarketplaceError::job_not_found(&job_id),
                    InvalidTransition::job(job_status, JobStatus::InProgress)
                        .with_detail("job was assigned or changed concurrently"),
                )
            })?;
        info!(
            application_id = %id,
            job_id = %job.id,
            worker = %application.applicant_id,
            "application accepted"
        );

        let open_siblings = self
            .store
            .list_applications(&job.id)?
            .into_iter()
            .filter(|sibling| sibling.id != application.id && !sibling.status.is_terminal())
            .map(|sibling| sibling.id)
            .collect();

        self.emit_status_change(&application);
        self.emit(MarketplaceEvent::JobUpdated {
            job_id: job.id.clone(),
            status: job.status,
        });

        Ok(ApplicationTransition {
            application,
            job: Some(job),
            open_siblings,
        })
    }

    pub fn withdraw_application(
        &self,
        actor: &Actor,
        id: &ApplicationId,
    ) -> Result<JobApplication, MarketplaceError> {
        let mut application = self.load_application(id)?;
        ensure(
            actor,
            Action::WithdrawApplication,
            Ownership {
                is_job_poster: false,
                is_applicant: application.applicant_id == actor.user_id,
            },
        )?;

        let previous = application.status;
        let expected_version = application.version;
        application.withdraw(Utc::now())?;

        let application = self
            .store
            .update_application(application, expected_version)
            .map_err(|error| {
                write_error(
                    error,
                    MarketplaceError::application_not_found(id),
                    InvalidTransition::application(previous, ApplicationStatus::Withdrawn)
                        .with_detail("application changed concurrently"),
                )
            })?;
        info!(application_id = %id, "application withdrawn");

        self.emit_status_change(&application);
        Ok(application)
    }

    pub fn list_job_applications(
        &self,
        actor: &Actor,
        job_id: &JobId,
    ) -> Result<Vec<JobApplication>, MarketplaceError> {
        let job = self.load_job(job_id)?;
        ensure(
            actor,
            Action::ListJobApplications,
            Ownership::poster(job.poster_id == actor.user_id),
        )?;
        Ok(self.store.list_applications(job_id)?)
    }

    pub fn my_applications(&self, actor: &Actor) -> Result<Vec<JobApplication>, MarketplaceError> {
        ensure(actor, Action::ListOwnApplications, Ownership::NONE)?;
        Ok(self.store.applications_for(&actor.user_id)?)
    }

    fn load_job(&self, id: &JobId) -> Result<Job, MarketplaceError> {
        self.store
            .get(id)?
            .ok_or_else(|| MarketplaceError::job_not_found(id))
    }

    fn load_application(&self, id: &ApplicationId) -> Result<JobApplication, MarketplaceError> {
        self.store
            .get_application(id)?
            .ok_or_else(|| MarketplaceError::application_not_found(id))
    }

    fn emit_status_change(&self, application: &JobApplication) {
        self.emit(MarketplaceEvent::ApplicationStatusChanged {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            status: application.status,
        });
    }

    /// Writes are already committed; a failed broadcast is logged, not raised.
    fn emit(&self, event: MarketplaceEvent) {
        let name = event.name();
        if let Err(error) = self.events.publish(event) {
            warn!(event = name, %error, "failed to publish marketplace event");
        }
    }
}

fn missing_or(error: StoreError, missing: MarketplaceError) -> MarketplaceError {
    match error {
        StoreError::NotFound => missing,
        other => other.into(),
    }
}

/// Name the record and the move that lost a conditional-write race.
fn write_error(
    error: StoreError,
    missing: MarketplaceError,
    conflict: InvalidTransition,
) -> MarketplaceError {
    match error {
        StoreError::Conflict => MarketplaceError::InvalidTransition(conflict),
        other => missing_or(other, missing),
    }
}

fn ensure(actor: &Actor, action: Action, ownership: Ownership) -> Result<(), MarketplaceError> {
    if authorize(actor, action, ownership).is_allowed() {
        Ok(())
    } else {
        debug!(user = %actor.user_id, role = ?actor.role, ?action, "access denied");
        Err(MarketplaceError::Forbidden(action))
    }
}
