//! Status rules for jobs and applications.
//!
//! Jobs move forward through `DRAFT → OPEN → IN_PROGRESS → COMPLETED`, may be
//! parked in `ON_HOLD` while open, and can be cancelled from any non-terminal
//! state. Applications follow `PENDING → REVIEWED → SHORTLISTED` and end in
//! `ACCEPTED`, `REJECTED`, or `WITHDRAWN`.

use std::fmt;

use chrono::{DateTime, Utc};

use super::domain::{ApplicationStatus, Job, JobApplication, JobStatus, UserId, WireCode};

/// Raised when a requested status change violates the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub detail: Option<&'static str>,
}

impl InvalidTransition {
    pub(crate) fn job(from: JobStatus, to: JobStatus) -> Self {
        Self {
            entity: "job",
            from: from.code(),
            to: to.code(),
            detail: None,
        }
    }

    pub(crate) fn application(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        Self {
            entity: "application",
            from: from.code(),
            to: to.code(),
            detail: None,
        }
    }

    /// A new application against a job that is not open.
    pub(crate) fn submission(job_status: JobStatus) -> Self {
        Self {
            entity: "application",
            from: "NONE",
            to: ApplicationStatus::Pending.code(),
            detail: match job_status {
                JobStatus::Draft => Some("job has not been published"),
                JobStatus::OnHold => Some("job is on hold"),
                _ => Some("job is no longer accepting applications"),
            },
        }
    }

    pub(crate) fn with_detail(mut self, detail: &'static str) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cannot move from {} to {}", self.entity, self.from, self.to)?;
        if let Some(detail) = self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidTransition {}

impl JobStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses in which a job may carry an assigned worker.
    pub const fn allows_assignment(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }

        matches!(
            (self, next),
            (_, Self::Cancelled)
                | (Self::Draft, Self::Open)
                | (Self::Open, Self::OnHold)
                | (Self::OnHold, Self::Open)
                | (Self::Open, Self::InProgress)
                | (Self::OnHold, Self::InProgress)
                | (Self::InProgress, Self::Completed)
        )
    }
}

impl ApplicationStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }

    /// Statuses counted against a job's `max_applicants` cap.
    pub const fn holds_capacity(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Reviewed | Self::Shortlisted | Self::Accepted
        )
    }

    /// Statuses that prevent the same applicant from applying again.
    pub const fn blocks_resubmission(self) -> bool {
        !matches!(self, Self::Withdrawn | Self::Rejected)
    }

    pub const fn is_employer_decision(self) -> bool {
        matches!(
            self,
            Self::Reviewed | Self::Shortlisted | Self::Accepted | Self::Rejected
        )
    }

    pub const fn capacity_holding() -> [Self; 4] {
        [
            Self::Pending,
            Self::Reviewed,
            Self::Shortlisted,
            Self::Accepted,
        ]
    }

    const fn stage(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Reviewed => 1,
            Self::Shortlisted => 2,
            Self::Accepted | Self::Rejected | Self::Withdrawn => 3,
        }
    }

    /// Employer-side moves only go forward and never leave a terminal state.
    pub fn check_employer_transition(self, next: Self) -> Result<(), InvalidTransition> {
        if self.is_terminal() || !next.is_employer_decision() || next.stage() <= self.stage() {
            return Err(InvalidTransition::application(self, next));
        }
        Ok(())
    }

    pub fn check_withdrawal(self) -> Result<(), InvalidTransition> {
        if self.is_terminal() {
            return Err(InvalidTransition::application(self, Self::Withdrawn));
        }
        Ok(())
    }
}

impl Job {
    /// Apply a status change, maintaining the publish/completion timestamps
    /// and the assignment invariant.
    pub fn transition_to(
        &mut self,
        next: JobStatus,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition::job(self.status, next));
        }

        match next {
            JobStatus::Open if self.published_at.is_none() => self.published_at = Some(now),
            JobStatus::Completed => self.completed_at = Some(now),
            _ => {}
        }

        self.status = next;
        if !next.allows_assignment() {
            self.assigned_worker_id = None;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Assign the accepted worker, advancing an open job into progress.
    pub fn assign_worker(
        &mut self,
        worker: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        if self.assigned_worker_id.is_some() {
            return Err(InvalidTransition::job(self.status, JobStatus::InProgress));
        }

        match self.status {
            JobStatus::Open => self.transition_to(JobStatus::InProgress, now)?,
            JobStatus::InProgress => self.updated_at = now,
            other => return Err(InvalidTransition::job(other, JobStatus::InProgress)),
        }

        self.assigned_worker_id = Some(worker);
        Ok(())
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == JobStatus::Open
    }
}

impl JobApplication {
    /// Record an employer decision; the first one stamps `reviewed_at`.
    pub fn record_decision(
        &mut self,
        next: ApplicationStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        self.status.check_employer_transition(next)?;
        self.status = next;
        if self.reviewed_at.is_none() {
            self.reviewed_at = Some(now);
        }
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn withdraw(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.status.check_withdrawal()?;
        self.status = ApplicationStatus::Withdrawn;
        self.updated_at = now;
        Ok(())
    }
}
