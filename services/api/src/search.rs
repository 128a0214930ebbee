use crate::infra::{seeded_store, LoggingEventPublisher};
use axum::extract::Query;
use axum::http::Uri;
use clap::Args;
use rigger::config::AppConfig;
use rigger::error::AppError;
use rigger::marketplace::{
    EventPublisher, JobSearchQuery, JobSearchResult, JobStore, MarketplaceError,
    MarketplaceService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Job seed CSV to search
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Filters in `GET /api/jobs` query-string form, e.g. `jobType=RIGGING&city=Perth`
    #[arg(long, value_parser = parse_query)]
    pub(crate) query: Option<JobSearchQuery>,
}

pub(crate) fn parse_query(raw: &str) -> Result<JobSearchQuery, String> {
    let uri: Uri = format!("/api/jobs?{}", raw.trim_start_matches('?'))
        .parse()
        .map_err(|err| format!("invalid query '{raw}': {err}"))?;
    Query::<JobSearchQuery>::try_from_uri(&uri)
        .map(|Query(query)| query)
        .map_err(|err| format!("invalid query '{raw}': {err}"))
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = seeded_store(Some(args.seed.as_path()))?;
    let service = MarketplaceService::new(
        Arc::new(store),
        Arc::new(LoggingEventPublisher),
        config.search.page_limits(),
    );

    let result = search_catalogue(&service, args.query.unwrap_or_default())?;
    serde_json::to_writer_pretty(std::io::stdout().lock(), &result)
        .map_err(std::io::Error::from)?;
    println!();
    Ok(())
}

pub(crate) fn search_catalogue<S, E>(
    service: &MarketplaceService<S, E>,
    query: JobSearchQuery,
) -> Result<JobSearchResult, MarketplaceError>
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let search = query.into_search()?;
    service.search_jobs(&search.filters, search.page, search.limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rigger::marketplace::{InMemoryJobStore, PageLimits};
    use rigger::seed::JobSeedImporter;
    use std::io::Cursor;

    const SEED: &str = "Id,Title,Description,Company,Job Type,Urgency,Suburb,City,State,Latitude,Longitude,Pay Type,Pay Amount,Currency,Start Date,End Date,Skills,Certifications,Max Applicants,Status,Poster,Created At
job-crane,Tower crane operator,Luffing crane,Harbour Lift Co,CRANE_OPERATION,HIGH,Barangaroo,Sydney,NSW,-33.8614,151.2016,DAILY,650,AUD,,,,,,OPEN,emp-harbour,2025-05-20T08:00:00Z
job-dogman,Dogman,Sling and signal,Westside Rigging,RIGGING,,Docklands,Melbourne,VIC,-37.8150,144.9460,HOURLY,52,AUD,,,,,,OPEN,emp-west,2025-05-21T08:00:00Z
";

    fn service() -> MarketplaceService<InMemoryJobStore, LoggingEventPublisher> {
        let jobs = JobSeedImporter::from_reader(Cursor::new(SEED), Utc::now()).expect("seed");
        MarketplaceService::new(
            Arc::new(InMemoryJobStore::with_jobs(jobs)),
            Arc::new(LoggingEventPublisher),
            PageLimits::default(),
        )
    }

    #[test]
    fn query_filters_the_seeded_catalogue() {
        let query = parse_query("jobType=CRANE_OPERATION,RIGGING&lat=-33.87&lng=151.21&radius=25")
            .expect("query");
        let result = search_catalogue(&service(), query).expect("search");

        assert_eq!(result.total, 1);
        assert_eq!(result.jobs[0].id.0, "job-crane");
    }

    #[test]
    fn empty_query_lists_newest_first() {
        let result = search_catalogue(&service(), JobSearchQuery::default()).expect("search");
        let ids: Vec<_> = result.jobs.iter().map(|job| job.id.0.as_str()).collect();
        assert_eq!(ids, vec!["job-dogman", "job-crane"]);
    }

    #[test]
    fn malformed_filters_surface_as_validation_errors() {
        let query = parse_query("status=SOMEDAY").expect("query");
        assert!(matches!(
            search_catalogue(&service(), query),
            Err(MarketplaceError::Validation(_))
        ));
    }
}
