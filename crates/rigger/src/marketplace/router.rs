use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use super::domain::{Actor, ApplicationId, JobId};
use super::error::MarketplaceError;
use super::events::EventPublisher;
use super::search::{JobSearchBody, JobSearchQuery};
use super::service::MarketplaceService;
use super::store::JobStore;
use super::validation::{
    CreateApplicationRequest, CreateJobRequest, UpdateApplicationStatusRequest, UpdateJobRequest,
};

type Service<S, E> = Arc<MarketplaceService<S, E>>;

/// Router builder exposing the job board and application workflow.
pub fn marketplace_router<S, E>(service: Service<S, E>) -> Router
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/jobs",
            get(list_jobs_handler::<S, E>).post(create_job_handler::<S, E>),
        )
        .route("/api/jobs/search", post(search_jobs_handler::<S, E>))
        .route(
            "/api/jobs/:job_id",
            get(get_job_handler::<S, E>)
                .patch(update_job_handler::<S, E>)
                .delete(delete_job_handler::<S, E>),
        )
        .route(
            "/api/jobs/:job_id/applications",
            post(submit_application_handler::<S, E>).get(job_applications_handler::<S, E>),
        )
        .route("/api/applications", get(my_applications_handler::<S, E>))
        .route(
            "/api/applications/:application_id",
            get(get_application_handler::<S, E>).patch(update_application_handler::<S, E>),
        )
        .with_state(service)
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, MarketplaceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_jobs_handler<S, E>(
    State(service): State<Service<S, E>>,
    query: Result<Query<JobSearchQuery>, QueryRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let result = query
        .map_err(MarketplaceError::from)
        .and_then(|Query(query)| query.into_search().map_err(MarketplaceError::from))
        .and_then(|search| service.search_jobs(&search.filters, search.page, search.limit));
    respond(StatusCode::OK, result)
}

pub(crate) async fn search_jobs_handler<S, E>(
    State(service): State<Service<S, E>>,
    body: Result<Json<JobSearchBody>, JsonRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let result = body
        .map_err(MarketplaceError::from)
        .and_then(|Json(body)| service.search_jobs(&body.filters, body.page, body.limit));
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_job_handler<S, E>(
    State(service): State<Service<S, E>>,
    actor: Actor,
    request: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let result = request
        .map_err(MarketplaceError::from)
        .and_then(|Json(request)| service.create_job(&actor, request));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn get_job_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    respond(StatusCode::OK, service.get_job(&JobId(job_id)))
}

pub(crate) async fn update_job_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(job_id): Path<String>,
    actor: Actor,
    patch: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let result = patch
        .map_err(MarketplaceError::from)
        .and_then(|Json(patch)| service.update_job(&actor, &JobId(job_id), patch));
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_job_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(job_id): Path<String>,
    actor: Actor,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    match service.delete_job(&actor, &JobId(job_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_application_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(job_id): Path<String>,
    actor: Actor,
    request: Result<Json<CreateApplicationRequest>, JsonRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let result = request
        .map_err(MarketplaceError::from)
        .and_then(|Json(request)| service.submit_application(&actor, &JobId(job_id), request));
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn job_applications_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(job_id): Path<String>,
    actor: Actor,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.list_job_applications(&actor, &JobId(job_id)),
    )
}

pub(crate) async fn my_applications_handler<S, E>(
    State(service): State<Service<S, E>>,
    actor: Actor,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    respond(StatusCode::OK, service.my_applications(&actor))
}

pub(crate) async fn get_application_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(application_id): Path<String>,
    actor: Actor,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.get_application(&actor, &ApplicationId(application_id)),
    )
}

pub(crate) async fn update_application_handler<S, E>(
    State(service): State<Service<S, E>>,
    Path(application_id): Path<String>,
    actor: Actor,
    request: Result<Json<UpdateApplicationStatusRequest>, JsonRejection>,
) -> Response
where
    S: JobStore + 'static,
    E: EventPublisher + 'static,
{
    let id = ApplicationId(application_id);
    let result = request
        .map_err(MarketplaceError::from)
        .and_then(|Json(request)| service.change_application_status(&actor, &id, request));
    respond(StatusCode::OK, result)
}
