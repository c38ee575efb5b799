use crate::common_types::MessageSizeLimit;
use crate::service::{
    ExtractTextRequest, ExtractTextResponse, HealthReport, OcrWorkerService, PingRequest,
    PingResponse,
};
use crate::AppResult;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Clone)]
pub struct ServerState {
    pub service: OcrWorkerService,
    pub shutdown: CancellationToken,
}

pub fn worker_router(state: ServerState, max_message_size: MessageSizeLimit) -> Router {
    Router::new()
        .route("/ocrworker.OcrWorker/Ping", post(ping))
        .route("/ocrworker.OcrWorker/ExtractText", post(extract_text))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_message_size.bytes))
        .with_state(state)
}

pub async fn start_server(
    addr: SocketAddr,
    state: ServerState,
    max_message_size: MessageSizeLimit,
) -> AppResult<()> {
    let listener = TcpListener::bind(&addr).await?;
    serve_on(listener, state, max_message_size).await
}

/// Serves until the state's shutdown token is cancelled, then drains in-flight requests.
pub async fn serve_on(
    listener: TcpListener,
    state: ServerState,
    max_message_size: MessageSizeLimit,
) -> AppResult<()> {
    info!(address = %listener.local_addr()?, "OCR worker listening");
    let shutdown = state.shutdown.clone();
    let app = worker_router(state, max_message_size);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("OCR worker stopped");
    Ok(())
}

/// Cancels `shutdown` on Ctrl-C, which also releases callers still queued at the gate.
pub async fn shutdown_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(err) => error!(error = %err, "Unable to listen for the shutdown signal"),
    }
    shutdown.cancel();
}

async fn ping(
    State(state): State<ServerState>,
    Json(request): Json<PingRequest>,
) -> Json<PingResponse> {
    Json(state.service.ping(request))
}

async fn extract_text(
    State(state): State<ServerState>,
    Json(request): Json<ExtractTextRequest>,
) -> Json<ExtractTextResponse> {
    Json(state.service.extract_text(request, &state.shutdown).await)
}

async fn health(State(state): State<ServerState>) -> Json<HealthReport> {
    Json(state.service.health())
}
