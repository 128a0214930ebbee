//! Job search: filter matching, deterministic ordering, and pagination.

mod filters;
pub mod geo;
mod pagination;
mod query;

pub use filters::{JobSearchFilters, LocationFilter, PayRange};
pub use pagination::{Page, PageLimits, PageRequest};
pub use query::{JobSearchBody, JobSearchQuery};

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Job, JobId, JobStatus, JobType, PayType, UrgencyLevel};

/// Newest first; identifier ascending breaks ties so paging is stable.
pub fn listing_order(a: &Job, b: &Job) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter, order, and page an in-memory collection of jobs.
pub fn select_jobs<'a, I>(jobs: I, filters: &JobSearchFilters, request: PageRequest) -> Page<Job>
where
    I: IntoIterator<Item = &'a Job>,
{
    if filters.is_unsatisfiable() {
        return Page::empty(request);
    }

    let mut matching: Vec<Job> = jobs
        .into_iter()
        .filter(|job| filters.matches(job))
        .cloned()
        .collect();
    matching.sort_by(listing_order);

    Page::slice(matching, request)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLocation {
    pub suburb: String,
    pub city: String,
    pub state: String,
}

/// Card-sized projection of a job for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub job_type: JobType,
    pub urgency_level: UrgencyLevel,
    pub location: SummaryLocation,
    pub pay_type: PayType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_amount: Option<f64>,
    pub currency: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub applications_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_applicants: Option<u32>,
    pub required_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
}

impl JobSummary {
    pub fn from_job(job: Job, applications_count: usize) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            company: job.company,
            job_type: job.job_type,
            urgency_level: job.urgency_level,
            location: SummaryLocation {
                suburb: job.location.suburb,
                city: job.location.city,
                state: job.location.state,
            },
            pay_type: job.pay_type,
            pay_amount: job.pay_amount,
            currency: job.currency,
            status: job.status,
            created_at: job.created_at,
            published_at: job.published_at,
            applications_count,
            max_applicants: job.max_applicants,
            required_skills: job.required_skill_ids.into_iter().collect(),
            estimated_duration: job.estimated_duration,
        }
    }
}

/// Response body for job listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchResult {
    pub jobs: Vec<JobSummary>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl From<Page<JobSummary>> for JobSearchResult {
    fn from(page: Page<JobSummary>) -> Self {
        Self {
            jobs: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        }
    }
}
