use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Address, ApplicationId, ApplicationStatus, Job, JobApplication, JobId, JobStatus, JobType,
    PayType, UrgencyLevel, UserId, DEFAULT_CURRENCY,
};
use super::lifecycle::InvalidTransition;
use super::search::geo;

const MAX_TITLE_CHARS: usize = 200;
const MAX_COVER_LETTER_CHARS: usize = 5000;

/// A single user-correctable problem with an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected field errors; empty means the payload is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Field error for a payload the deserializer refused, e.g.
    /// `...target type: location: missing field `city` at line 1 column 80`
    /// becomes `location.city`. Anything without a path is charged to
    /// `fallback`.
    pub fn from_rejection(fallback: &str, text: &str) -> Self {
        let detail = ["target type: ", "query string: "]
            .iter()
            .find_map(|marker| text.split_once(marker).map(|(_, rest)| rest))
            .unwrap_or(text);
        let detail = match detail.find(" at line ") {
            Some(end) => &detail[..end],
            None => detail,
        };
        let (path, message) = match detail.split_once(": ") {
            Some((path, rest)) if !path.is_empty() && !path.contains(' ') => (Some(path), rest),
            _ => (None, detail),
        };

        let missing = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split_once('`'))
            .map(|(name, _)| name);
        match (path, missing) {
            (Some(path), Some(name)) => Self::single(&format!("{path}.{name}"), "is required"),
            (None, Some(name)) => Self::single(name, "is required"),
            (Some(path), None) => Self::single(path, message),
            (None, None) => Self::single(fallback, message),
        }
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{} ({})", error.field, error.message))
            .collect();
        write!(f, "invalid fields: {}", details.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "must not be empty");
    }
}

fn check_amount(errors: &mut ValidationErrors, field: &str, value: Option<f64>) {
    if let Some(amount) = value {
        if !amount.is_finite() || amount < 0.0 {
            errors.push(field, "must be a non-negative number");
        }
    }
}

fn check_location(errors: &mut ValidationErrors, location: &Address) {
    require_text(errors, "location.city", &location.city);
    require_text(errors, "location.state", &location.state);
    if let Some(coordinates) = location.coordinates {
        if !geo::is_valid(coordinates) {
            errors.push("location.coordinates", "latitude/longitude out of range");
        }
    }
}

fn check_dates(errors: &mut ValidationErrors, start: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.push("endDate", "must not precede startDate");
        }
    }
}

fn normalize_currency(errors: &mut ValidationErrors, raw: Option<&str>) -> String {
    let code = raw.map(str::trim).unwrap_or(DEFAULT_CURRENCY);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("currency", "must be a three letter ISO code");
    }
    code.to_ascii_uppercase()
}

fn identifier_set(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Payload accepted by `POST /api/jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub location: Address,
    pub job_type: JobType,
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub pay_type: PayType,
    #[serde(default)]
    pub pay_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub safety_requirements: Vec<String>,
    #[serde(default)]
    pub required_skill_ids: Vec<String>,
    #[serde(default)]
    pub required_certification_ids: Vec<String>,
    #[serde(default)]
    pub max_applicants: Option<u32>,
    /// Post straight to `OPEN`; `false` keeps the job as a `DRAFT`.
    #[serde(default = "default_publish")]
    pub publish: bool,
}

const fn default_publish() -> bool {
    true
}

impl CreateJobRequest {
    /// Validate the payload and build the job owned by `poster`.
    pub fn into_job(self, poster: UserId, now: DateTime<Utc>) -> Result<Job, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        require_text(&mut errors, "title", &self.title);
        if self.title.chars().count() > MAX_TITLE_CHARS {
            errors.push("title", format!("must be at most {MAX_TITLE_CHARS} characters"));
        }
        require_text(&mut errors, "description", &self.description);
        require_text(&mut errors, "company", &self.company);
        check_location(&mut errors, &self.location);
        check_dates(&mut errors, self.start_date, self.end_date);
        check_amount(&mut errors, "payAmount", self.pay_amount);
        if self.max_applicants == Some(0) {
            errors.push("maxApplicants", "must be at least 1");
        }
        let currency = normalize_currency(&mut errors, self.currency.as_deref());

        errors.into_result()?;

        let (status, published_at) = if self.publish {
            (JobStatus::Open, Some(now))
        } else {
            (JobStatus::Draft, None)
        };

        Ok(Job {
            id: JobId::generate(),
            title: self.title.trim().to_string(),
            description: self.description,
            company: self.company.trim().to_string(),
            requirements: self.requirements,
            location: self.location,
            job_type: self.job_type,
            urgency_level: self.urgency_level,
            estimated_duration: self.estimated_duration,
            start_date: self.start_date,
            end_date: self.end_date,
            pay_type: self.pay_type,
            pay_amount: self.pay_amount,
            currency,
            safety_requirements: self.safety_requirements,
            required_skill_ids: identifier_set(self.required_skill_ids),
            required_certification_ids: identifier_set(self.required_certification_ids),
            status,
            max_applicants: self.max_applicants,
            poster_id: poster,
            assigned_worker_id: None,
            created_at: now,
            updated_at: now,
            published_at,
            completed_at: None,
            version: 0,
        })
    }
}

/// Partial update accepted by `PATCH /api/jobs/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub location: Option<Address>,
    pub urgency_level: Option<UrgencyLevel>,
    pub estimated_duration: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pay_type: Option<PayType>,
    pub pay_amount: Option<f64>,
    pub safety_requirements: Option<Vec<String>>,
    pub required_skill_ids: Option<Vec<String>>,
    pub required_certification_ids: Option<Vec<String>>,
    pub max_applicants: Option<u32>,
    pub status: Option<JobStatus>,
}

/// Why a job update could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum JobPatchError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl UpdateJobRequest {
    /// Apply the provided fields to `job`, field checks first, status last.
    pub fn apply_to(self, job: &mut Job, now: DateTime<Utc>) -> Result<(), JobPatchError> {
        let mut errors = ValidationErrors::default();

        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
        }
        if let Some(description) = &self.description {
            require_text(&mut errors, "description", description);
        }
        if let Some(company) = &self.company {
            require_text(&mut errors, "company", company);
        }
        if let Some(location) = &self.location {
            check_location(&mut errors, location);
        }
        check_dates(
            &mut errors,
            self.start_date.or(job.start_date),
            self.end_date.or(job.end_date),
        );
        check_amount(&mut errors, "payAmount", self.pay_amount);
        if self.max_applicants == Some(0) {
            errors.push("maxApplicants", "must be at least 1");
        }
        errors.into_result()?;

        if let Some(status) = self.status {
            if status != job.status {
                job.transition_to(status, now)?;
            }
        }

        if let Some(title) = self.title {
            job.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(company) = self.company {
            job.company = company.trim().to_string();
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(urgency) = self.urgency_level {
            job.urgency_level = urgency;
        }
        if let Some(duration) = self.estimated_duration {
            job.estimated_duration = Some(duration);
        }
        if let Some(start) = self.start_date {
            job.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            job.end_date = Some(end);
        }
        if let Some(pay_type) = self.pay_type {
            job.pay_type = pay_type;
        }
        if let Some(amount) = self.pay_amount {
            job.pay_amount = Some(amount);
        }
        if let Some(safety) = self.safety_requirements {
            job.safety_requirements = safety;
        }
        if let Some(skills) = self.required_skill_ids {
            job.required_skill_ids = identifier_set(skills);
        }
        if let Some(certifications) = self.required_certification_ids {
            job.required_certification_ids = identifier_set(certifications);
        }
        if let Some(cap) = self.max_applicants {
            job.max_applicants = Some(cap);
        }

        job.updated_at = now;
        Ok(())
    }
}

/// Payload accepted by `POST /api/jobs/:id/applications`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateApplicationRequest {
    pub cover_letter: Option<String>,
    pub proposed_rate: Option<f64>,
    pub availability: Option<String>,
}

impl CreateApplicationRequest {
    pub fn into_application(
        self,
        job_id: JobId,
        applicant: UserId,
        now: DateTime<Utc>,
    ) -> Result<JobApplication, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_amount(&mut errors, "proposedRate", self.proposed_rate);
        if let Some(letter) = &self.cover_letter {
            if letter.chars().count() > MAX_COVER_LETTER_CHARS {
                errors.push(
                    "coverLetter",
                    format!("must be at most {MAX_COVER_LETTER_CHARS} characters"),
                );
            }
        }
        errors.into_result()?;

        Ok(JobApplication {
            id: ApplicationId::generate(),
            job_id,
            applicant_id: applicant,
            cover_letter: self.cover_letter.filter(|text| !text.trim().is_empty()),
            proposed_rate: self.proposed_rate,
            availability: self.availability.filter(|text| !text.trim().is_empty()),
            status: ApplicationStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
            version: 0,
        })
    }
}

/// Payload accepted by `PATCH /api/applications/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}
