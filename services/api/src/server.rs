use crate::cli::ServeArgs;
use crate::infra::{
    default_offerings, seed_households, AppState, InMemoryOfferingRepository,
    InMemoryProposalRepository, InMemoryRequestRepository, InMemoryTargetDirectory,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use benefact::config::AppConfig;
use benefact::error::AppError;
use benefact::telemetry;
use benefact::workflows::benefits::catalog::{CatalogService, OfferingRepository};
use benefact::workflows::benefits::modifications::ModificationEngine;
use benefact::workflows::benefits::requests::BenefitRequestService;
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
    if let Some(catalog) = args.catalog.take() {
        config.catalog.seed_path = Some(catalog);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let offerings = Arc::new(InMemoryOfferingRepository::default());
    let catalog = CatalogService::new(offerings.clone());
    match &config.catalog.seed_path {
        Some(path) => {
            let imported = catalog.import_path(path)?;
            info!(count = imported.len(), path = %path.display(), "offering catalog loaded");
        }
        None => {
            for offering in default_offerings() {
                offerings.insert(offering).map_err(|err| {
                    AppError::Io(std::io::Error::other(format!(
                        "could not seed offerings: {err}"
                    )))
                })?;
            }
        }
    }

    let targets = Arc::new(InMemoryTargetDirectory::default());
    seed_households(&targets).map_err(|err| {
        AppError::Io(std::io::Error::other(format!(
            "could not seed household records: {err}"
        )))
    })?;

    let request_service = Arc::new(BenefitRequestService::new(
        Arc::new(InMemoryRequestRepository::default()),
        offerings,
    ));
    let modification_engine = Arc::new(ModificationEngine::new(
        Arc::new(InMemoryProposalRepository::default()),
        targets,
    ));

    let app = with_workflow_routes(request_service, modification_engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "benefits administration service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
