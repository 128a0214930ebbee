use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "AUD";

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for job applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for platform users (posters, workers, reviewers).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4().simple()))
    }
}

impl ApplicationId {
    pub fn generate() -> Self {
        Self(format!("app-{}", uuid::Uuid::new_v4().simple()))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enumerations exchanged on the wire as upper-case codes (`CRANE_OPERATION`).
pub trait WireCode: Sized + Copy + 'static {
    fn ordered() -> &'static [Self];
    fn code(self) -> &'static str;

    fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered()
            .iter()
            .copied()
            .find(|candidate| candidate.code().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    CraneOperation,
    Rigging,
    Scaffolding,
    HeavyLifting,
    Construction,
    Maintenance,
    Inspection,
    Training,
    Other,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CraneOperation => "Crane Operation",
            Self::Rigging => "Rigging",
            Self::Scaffolding => "Scaffolding",
            Self::HeavyLifting => "Heavy Lifting",
            Self::Construction => "Construction",
            Self::Maintenance => "Maintenance",
            Self::Inspection => "Inspection",
            Self::Training => "Training",
            Self::Other => "Other",
        }
    }
}

impl WireCode for JobType {
    fn ordered() -> &'static [Self] {
        &[
            Self::CraneOperation,
            Self::Rigging,
            Self::Scaffolding,
            Self::HeavyLifting,
            Self::Construction,
            Self::Maintenance,
            Self::Inspection,
            Self::Training,
            Self::Other,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::CraneOperation => "CRANE_OPERATION",
            Self::Rigging => "RIGGING",
            Self::Scaffolding => "SCAFFOLDING",
            Self::HeavyLifting => "HEAVY_LIFTING",
            Self::Construction => "CONSTRUCTION",
            Self::Maintenance => "MAINTENANCE",
            Self::Inspection => "INSPECTION",
            Self::Training => "TRAINING",
            Self::Other => "OTHER",
        }
    }
}

/// Employer-assigned priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl WireCode for UrgencyLevel {
    fn ordered() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayType {
    Hourly,
    Daily,
    Project,
    Weekly,
    Monthly,
}

impl WireCode for PayType {
    fn ordered() -> &'static [Self] {
        &[
            Self::Hourly,
            Self::Daily,
            Self::Project,
            Self::Weekly,
            Self::Monthly,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Project => "PROJECT",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Open,
    InProgress,
    Completed,
    Cancelled,
    OnHold,
}

impl WireCode for JobStatus {
    fn ordered() -> &'static [Self] {
        &[
            Self::Draft,
            Self::Open,
            Self::InProgress,
            Self::Completed,
            Self::Cancelled,
            Self::OnHold,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::OnHold => "ON_HOLD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl WireCode for ApplicationStatus {
    fn ordered() -> &'static [Self] {
        &[
            Self::Pending,
            Self::Reviewed,
            Self::Shortlisted,
            Self::Accepted,
            Self::Rejected,
            Self::Withdrawn,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::Shortlisted => "SHORTLISTED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Worker,
    Employer,
    SafetyOfficer,
}

impl WireCode for UserRole {
    fn ordered() -> &'static [Self] {
        &[
            Self::Admin,
            Self::Worker,
            Self::Employer,
            Self::SafetyOfficer,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Worker => "WORKER",
            Self::Employer => "EMPLOYER",
            Self::SafetyOfficer => "SAFETY_OFFICER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    PendingVerification,
}

impl WireCode for UserStatus {
    fn ordered() -> &'static [Self] {
        &[
            Self::Active,
            Self::Inactive,
            Self::Suspended,
            Self::PendingVerification,
        ]
    }

    fn code(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::PendingVerification => "PENDING_VERIFICATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Structured site address; coordinates are optional and drive radius search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suburb: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A posted work opportunity with requirements, pay, and safety terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub requirements: Vec<String>,
    pub location: Address,
    pub job_type: JobType,
    pub urgency_level: UrgencyLevel,
    pub estimated_duration: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pay_type: PayType,
    pub pay_amount: Option<f64>,
    pub currency: String,
    pub safety_requirements: Vec<String>,
    pub required_skill_ids: BTreeSet<String>,
    pub required_certification_ids: BTreeSet<String>,
    pub status: JobStatus,
    pub max_applicants: Option<u32>,
    pub poster_id: UserId,
    pub assigned_worker_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// A worker's request to be assigned to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: UserId,
    pub cover_letter: Option<String>,
    pub proposed_rate: Option<f64>,
    pub availability: Option<String>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// Platform account. Skills, certifications, experience, and safety records
/// are owned elsewhere and referenced by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(default)]
    pub certification_ids: Vec<String>,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    #[serde(default)]
    pub experience_ids: Vec<String>,
    #[serde(default)]
    pub safety_record_ids: Vec<String>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id.clone(),
            role: self.role,
            status: self.status,
        }
    }
}

/// Authenticated caller as supplied by the upstream session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
    pub status: UserStatus,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
            status: UserStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_parse_case_insensitively() {
        assert_eq!(
            JobType::from_code("crane_operation"),
            Some(JobType::CraneOperation)
        );
        assert_eq!(
            UserRole::from_code(" SAFETY_OFFICER "),
            Some(UserRole::SafetyOfficer)
        );
        assert_eq!(PayType::from_code("fortnightly"), None);
    }

    #[test]
    fn wire_codes_match_serde_names() {
        for job_type in JobType::ordered() {
            let encoded = serde_json::to_value(job_type).expect("serialize");
            assert_eq!(encoded, serde_json::json!(job_type.code()));
        }
        for status in ApplicationStatus::ordered() {
            let encoded = serde_json::to_value(status).expect("serialize");
            assert_eq!(encoded, serde_json::json!(status.code()));
        }
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let first = JobId::generate();
        let second = JobId::generate();
        assert!(first.0.starts_with("job-"));
        assert_ne!(first, second);
        assert!(ApplicationId::generate().0.starts_with("app-"));
    }
}
