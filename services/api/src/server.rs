use crate::cli::ServeArgs;
use crate::infra::{AppState, WardServices};
use crate::routes::with_ward_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use icu_ward::config::AppConfig;
use icu_ward::error::AppError;
use icu_ward::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = WardServices::in_memory(&config.ward)?;

    let app = with_ward_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        metrics_window_days = config.ward.metrics_window_days,
        "icu ward engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
