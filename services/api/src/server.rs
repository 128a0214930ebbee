use crate::cli::ServeArgs;
use crate::infra::{seeded_store, AppState, LoggingEventPublisher};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rigger::config::AppConfig;
use rigger::error::AppError;
use rigger::marketplace::{marketplace_router, MarketplaceService};
use rigger::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed.take() {
        config.seed.jobs_csv = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(seeded_store(config.seed.jobs_csv.as_deref())?);
    let events = Arc::new(LoggingEventPublisher);
    let service = Arc::new(MarketplaceService::new(
        store,
        events,
        config.search.page_limits(),
    ));

    let app = with_operational_routes(marketplace_router(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rigger job board ready");

    axum::serve(listener, app).await?;
    Ok(())
}
