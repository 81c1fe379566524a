use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::board::{BoardService, MemoryStore};
use job_board::config::{AppConfig, TransitionMode};
use job_board::error::AppError;
use job_board::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, LogNotifier};
use crate::routes::with_board_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.strict_transitions {
        config.board.transitions = TransitionMode::Strict;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(BoardService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(LogNotifier),
        config.board.clone(),
    ));

    let app = with_board_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        transitions = ?config.board.transitions,
        resume_max_bytes = config.board.resume.max_bytes,
        "job board ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
