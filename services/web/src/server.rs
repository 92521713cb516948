use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::api::http_client;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
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
        http: http_client(&config.backend)?,
        backend: Arc::new(config.backend.clone()),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.backend.base_url,
        "job board web service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
