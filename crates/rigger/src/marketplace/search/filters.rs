use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::geo;
use crate::marketplace::domain::{Coordinates, Job, JobStatus, JobType, PayType, UrgencyLevel};
use crate::marketplace::validation::ValidationErrors;

/// Geographic constraint. Radius filtering applies only when both a radius
/// and reference coordinates are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    /// Kilometres.
    pub radius: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Search criteria. Every supplied dimension must hold; set dimensions match
/// when the job's value is any member. Empty sets count as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSearchFilters {
    pub job_type: Vec<JobType>,
    pub urgency_level: Vec<UrgencyLevel>,
    pub pay_type: Vec<PayType>,
    pub status: Vec<JobStatus>,
    pub location: Option<LocationFilter>,
    pub pay_range: Option<PayRange>,
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    pub required_skills: Vec<String>,
    pub required_certifications: Vec<String>,
    pub search_term: Option<String>,
}

impl JobSearchFilters {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if let Some(location) = &self.location {
            if let Some(radius) = location.radius {
                if !radius.is_finite() || radius < 0.0 {
                    errors.push("location.radius", "must be a non-negative distance in km");
                }
                if location.coordinates.is_none() {
                    errors.push(
                        "location.coordinates",
                        "required when a search radius is given",
                    );
                }
            }
            if let Some(coordinates) = location.coordinates {
                if !geo::is_valid(coordinates) {
                    errors.push("location.coordinates", "latitude/longitude out of range");
                }
            }
        }

        if let Some(range) = self.pay_range {
            for (field, bound) in [("payRange.min", range.min), ("payRange.max", range.max)] {
                if bound.is_some_and(|value| !value.is_finite()) {
                    errors.push(field, "must be a number");
                }
            }
        }

        errors.into_result()
    }

    /// Inverted bounds can never match; callers return an empty page.
    pub fn is_unsatisfiable(&self) -> bool {
        let inverted_dates = matches!(
            (self.start_date_from, self.start_date_to),
            (Some(from), Some(to)) if from > to
        );
        let inverted_pay = matches!(
            self.pay_range,
            Some(PayRange { min: Some(min), max: Some(max) }) if min > max
        );
        inverted_dates || inverted_pay
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.matches_sets(job)
            && self.matches_location(job)
            && self.matches_pay(job)
            && self.matches_start_date(job)
            && self.matches_requirements(job)
            && self.matches_term(job)
    }

    fn matches_sets(&self, job: &Job) -> bool {
        any_of(&self.job_type, &job.job_type)
            && any_of(&self.urgency_level, &job.urgency_level)
            && any_of(&self.pay_type, &job.pay_type)
            && any_of(&self.status, &job.status)
    }

    fn matches_location(&self, job: &Job) -> bool {
        let Some(location) = &self.location else {
            return true;
        };

        if !text_equals(location.city.as_deref(), &job.location.city)
            || !text_equals(location.state.as_deref(), &job.location.state)
        {
            return false;
        }

        let (Some(reference), Some(radius)) = (location.coordinates, location.radius) else {
            return true;
        };
        match job.location.coordinates {
            Some(site) => geo::distance_km(reference, site) <= geo::capped_radius(radius),
            None => false,
        }
    }

    fn matches_pay(&self, job: &Job) -> bool {
        let Some(range) = self.pay_range else {
            return true;
        };
        if range.min.is_none() && range.max.is_none() {
            return true;
        }

        match job.pay_amount {
            Some(amount) => {
                range.min.map_or(true, |min| amount >= min)
                    && range.max.map_or(true, |max| amount <= max)
            }
            None => false,
        }
    }

    fn matches_start_date(&self, job: &Job) -> bool {
        if self.start_date_from.is_none() && self.start_date_to.is_none() {
            return true;
        }

        match job.start_date {
            Some(start) => {
                self.start_date_from.map_or(true, |from| start >= from)
                    && self.start_date_to.map_or(true, |to| start <= to)
            }
            None => false,
        }
    }

    fn matches_requirements(&self, job: &Job) -> bool {
        self.required_skills
            .iter()
            .all(|skill| job.required_skill_ids.contains(skill.trim()))
            && self
                .required_certifications
                .iter()
                .all(|cert| job.required_certification_ids.contains(cert.trim()))
    }

    fn matches_term(&self, job: &Job) -> bool {
        let Some(term) = self.search_term.as_deref().map(str::trim) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }

        let needle = term.to_lowercase();
        [&job.title, &job.company, &job.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn any_of<T: PartialEq>(allowed: &[T], value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

fn text_equals(expected: Option<&str>, actual: &str) -> bool {
    match expected.map(str::trim) {
        None | Some("") => true,
        Some(expected) => expected.eq_ignore_ascii_case(actual.trim()),
    }
}
