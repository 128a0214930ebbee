use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use super::filters::{JobSearchFilters, LocationFilter, PayRange};
use crate::marketplace::domain::{Coordinates, WireCode};
use crate::marketplace::validation::ValidationErrors;

/// Flat query-string form of [`JobSearchFilters`]; sets are comma separated
/// (`jobType=CRANE_OPERATION,RIGGING`). Every value arrives as text so that a
/// malformed number or date is reported against its own parameter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSearchQuery {
    pub job_type: Option<String>,
    pub urgency: Option<String>,
    pub pay_type: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub min_pay: Option<String>,
    pub max_pay: Option<String>,
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
    pub skills: Option<String>,
    pub certifications: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Filters plus the raw page request, as accepted by `POST /api/jobs/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSearchBody {
    pub filters: JobSearchFilters,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl JobSearchQuery {
    pub fn into_filters(self) -> Result<JobSearchFilters, ValidationErrors> {
        self.into_search().map(|search| search.filters)
    }

    /// Parse every parameter, collecting all problems before failing.
    pub fn into_search(self) -> Result<JobSearchBody, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let job_type = parse_codes(&mut errors, "jobType", self.job_type.as_deref());
        let urgency_level = parse_codes(&mut errors, "urgency", self.urgency.as_deref());
        let pay_type = parse_codes(&mut errors, "payType", self.pay_type.as_deref());
        let status = parse_codes(&mut errors, "status", self.status.as_deref());

        let lat = parse_number::<f64>(&mut errors, "lat", self.lat.as_deref());
        let lng = parse_number::<f64>(&mut errors, "lng", self.lng.as_deref());
        let radius = parse_number::<f64>(&mut errors, "radius", self.radius.as_deref());
        let min_pay = parse_number::<f64>(&mut errors, "minPay", self.min_pay.as_deref());
        let max_pay = parse_number::<f64>(&mut errors, "maxPay", self.max_pay.as_deref());
        let page = parse_number::<i64>(&mut errors, "page", self.page.as_deref());
        let limit = parse_number::<i64>(&mut errors, "limit", self.limit.as_deref());
        let start_date_from =
            parse_day(&mut errors, "startDateFrom", self.start_date_from.as_deref());
        let start_date_to = parse_day(&mut errors, "startDateTo", self.start_date_to.as_deref());

        let coordinates = match (lat, lng) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ if self.lat.is_some() && self.lng.is_some() => None,
            _ => {
                errors.push("lat", "lat and lng must be supplied together");
                None
            }
        };

        let location = if self.city.is_some()
            || self.state.is_some()
            || radius.is_some()
            || coordinates.is_some()
        {
            Some(LocationFilter {
                city: self.city,
                state: self.state,
                radius,
                coordinates,
            })
        } else {
            None
        };

        let pay_range = if min_pay.is_some() || max_pay.is_some() {
            Some(PayRange {
                min: min_pay,
                max: max_pay,
            })
        } else {
            None
        };

        errors.into_result()?;

        Ok(JobSearchBody {
            filters: JobSearchFilters {
                job_type,
                urgency_level,
                pay_type,
                status,
                location,
                pay_range,
                start_date_from,
                start_date_to,
                required_skills: split_list(self.skills.as_deref()),
                required_certifications: split_list(self.certifications.as_deref()),
                search_term: self.q,
            },
            page,
            limit,
        })
    }
}

fn parse_number<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(field, format!("'{raw}' is not a number"));
            None
        }
    }
}

fn parse_day(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(_) => {
            errors.push(field, format!("'{raw}' is not YYYY-MM-DD"));
            None
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_codes<T: WireCode>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Vec<T> {
    let mut parsed = Vec::new();
    for item in split_list(raw) {
        match T::from_code(&item) {
            Some(code) => parsed.push(code),
            None => errors.push(field, format!("unknown value '{item}'")),
        }
    }
    parsed
}
