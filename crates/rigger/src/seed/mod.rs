//! CSV import of job postings used to seed a store at start-up.

mod parser;

use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;

use crate::marketplace::domain::{
    Address, Coordinates, Job, JobId, JobStatus, JobType, PayType, UrgencyLevel, UserId, WireCode,
};
use crate::marketplace::validation::CreateJobRequest;

use parser::{parse_date, parse_timestamp, split_identifiers, JobRow, SeedRow};

#[derive(Debug)]
pub enum SeedImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, reason: String },
}

impl std::fmt::Display for SeedImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedImportError::Io(err) => write!(f, "failed to read job seed file: {}", err),
            SeedImportError::Csv(err) => write!(f, "invalid job seed CSV data: {}", err),
            SeedImportError::Row { line, reason } => {
                write!(f, "job seed line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for SeedImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedImportError::Io(err) => Some(err),
            SeedImportError::Csv(err) => Some(err),
            SeedImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for SeedImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SeedImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct JobSeedImporter;

impl JobSeedImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, SeedImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, now)
    }

    /// Rows without `Created At` are stamped with `now`; rows without `Id`
    /// get a generated identifier.
    pub fn from_reader<R: Read>(
        reader: R,
        now: DateTime<Utc>,
    ) -> Result<Vec<Job>, SeedImportError> {
        parser::parse_rows(reader)?
            .into_iter()
            .map(|row| build_job(row, now))
            .collect()
    }
}

fn code<T: WireCode>(line: u64, column: &str, raw: &str) -> Result<T, SeedImportError> {
    T::from_code(raw).ok_or_else(|| SeedImportError::Row {
        line,
        reason: format!("unknown {column} '{raw}'"),
    })
}

fn date_cell(
    line: u64,
    column: &str,
    raw: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, SeedImportError> {
    raw.map(|value| {
        parse_date(value).ok_or_else(|| SeedImportError::Row {
            line,
            reason: format!("{column} '{value}' is not YYYY-MM-DD"),
        })
    })
    .transpose()
}

fn build_job(row: SeedRow, now: DateTime<Utc>) -> Result<Job, SeedImportError> {
    let SeedRow { line, job: row } = row;
    let JobRow {
        id,
        title,
        description,
        company,
        job_type,
        urgency,
        suburb,
        city,
        state,
        latitude,
        longitude,
        pay_type,
        pay_amount,
        currency,
        start_date,
        end_date,
        skills,
        certifications,
        max_applicants,
        status,
        poster,
        created_at,
    } = row;

    let created_at = match created_at.as_deref() {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| SeedImportError::Row {
            line,
            reason: format!("Created At '{raw}' is not a timestamp"),
        })?,
        None => now,
    };
    let status = match status.as_deref() {
        Some(raw) => code::<JobStatus>(line, "Status", raw)?,
        None => JobStatus::Open,
    };
    if !matches!(status, JobStatus::Draft | JobStatus::Open | JobStatus::OnHold) {
        return Err(SeedImportError::Row {
            line,
            reason: format!("seeded jobs cannot start as {}", status.code()),
        });
    }

    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let request = CreateJobRequest {
        title,
        description,
        company,
        requirements: Vec::new(),
        location: Address {
            suburb,
            city,
            state,
            coordinates,
            ..Address::default()
        },
        job_type: code::<JobType>(line, "Job Type", &job_type)?,
        urgency_level: match urgency.as_deref() {
            Some(raw) => code::<UrgencyLevel>(line, "Urgency", raw)?,
            None => UrgencyLevel::Medium,
        },
        estimated_duration: None,
        start_date: date_cell(line, "Start Date", start_date.as_deref())?,
        end_date: date_cell(line, "End Date", end_date.as_deref())?,
        pay_type: code::<PayType>(line, "Pay Type", &pay_type)?,
        pay_amount,
        currency,
        safety_requirements: Vec::new(),
        required_skill_ids: split_identifiers(&skills),
        required_certification_ids: split_identifiers(&certifications),
        max_applicants,
        publish: status != JobStatus::Draft,
    };

    let mut job = request
        .into_job(UserId(poster), created_at)
        .map_err(|errors| SeedImportError::Row {
            line,
            reason: errors.to_string(),
        })?;
    if status == JobStatus::OnHold {
        job.transition_to(JobStatus::OnHold, created_at)
            .map_err(|err| SeedImportError::Row {
                line,
                reason: err.to_string(),
            })?;
    }
    if let Some(id) = id {
        job.id = JobId(id);
    }

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Id,Title,Description,Company,Job Type,Urgency,Suburb,City,State,Latitude,Longitude,Pay Type,Pay Amount,Currency,Start Date,End Date,Skills,Certifications,Max Applicants,Status,Poster,Created At";

    fn now() -> DateTime<Utc> {
        parse_timestamp("2025-06-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn imports_rows_into_jobs() {
        let csv = format!(
            "{HEADER}\n\
job-crane,Tower crane operator,Luffing crane on CBD tower,Harbour Lift Co,CRANE_OPERATION,HIGH,Barangaroo,Sydney,NSW,-33.8614,151.2016,DAILY,650,AUD,2025-07-01,2025-09-30,tower-crane;dogging,hrwl-ct,5,OPEN,emp-harbour,2025-05-20T08:00:00Z\n\
,Scaffolder,Facade scaffold,Westside,scaffolding,,Docklands,Melbourne,VIC,,,HOURLY,52,,,,,,,ON_HOLD,emp-west,\n"
        );

        let jobs = JobSeedImporter::from_reader(Cursor::new(csv), now()).expect("import");
        assert_eq!(jobs.len(), 2);

        let crane = &jobs[0];
        assert_eq!(crane.id, JobId("job-crane".to_string()));
        assert_eq!(crane.job_type, JobType::CraneOperation);
        assert_eq!(crane.pay_amount, Some(650.0));
        assert_eq!(crane.currency, "AUD");
        assert_eq!(crane.max_applicants, Some(5));
        assert_eq!(crane.required_skill_ids.len(), 2);
        assert!(crane.location.coordinates.is_some());
        assert_eq!(
            crane.created_at,
            parse_timestamp("2025-05-20T08:00:00Z").expect("timestamp")
        );

        let scaffold = &jobs[1];
        assert!(scaffold.id.0.starts_with("job-"));
        assert_eq!(scaffold.status, JobStatus::OnHold);
        assert_eq!(scaffold.urgency_level, UrgencyLevel::Medium);
        assert!(scaffold.location.coordinates.is_none());
        assert_eq!(scaffold.created_at, now());
    }

    #[test]
    fn unknown_codes_name_the_line() {
        let csv = format!(
            "{HEADER}\n,Rigger,Crew,Lift Co,RIGGING,,,Perth,WA,,,FORTNIGHTLY,40,,,,,,,,emp-1,\n"
        );

        let error = JobSeedImporter::from_reader(Cursor::new(csv), now()).expect_err("bad code");
        assert_eq!(error.to_string(), "job seed line 2: unknown Pay Type 'FORTNIGHTLY'");
    }

    #[test]
    fn validation_failures_are_reported_per_row() {
        let csv = format!(
            "{HEADER}\n,,Crew,Lift Co,RIGGING,,,Perth,WA,,,HOURLY,40,,,,,,,,emp-1,\n"
        );

        match JobSeedImporter::from_reader(Cursor::new(csv), now()) {
            Err(SeedImportError::Row { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("title"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn completed_jobs_cannot_be_seeded() {
        let csv = format!(
            "{HEADER}\n,Rigger,Crew,Lift Co,RIGGING,,,Perth,WA,,,HOURLY,40,,,,,,,COMPLETED,emp-1,\n"
        );
        assert!(matches!(
            JobSeedImporter::from_reader(Cursor::new(csv), now()),
            Err(SeedImportError::Row { .. })
        ));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = JobSeedImporter::from_path("./does-not-exist.csv", now())
            .expect_err("expected io error");
        assert!(matches!(error, SeedImportError::Io(_)));
    }
}
