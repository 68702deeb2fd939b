use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use code_exec::{
    channel::{CodeExecutionChannel, MethodCall, MethodResponse},
    CodeExecutionService, ExecutionReply, ExecutionRequest, LanguageStatus, ServiceConfig,
};
use serde_json::json;
use std::{future::Future, net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
    #[error("Execution error: {0}")]
    ExecutionError(#[from] code_exec::Error),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::UnknownChannel(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::ExecutionError(ref e) => {
                error!("Request failed on the host: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ServerError::ServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    channel: Arc<CodeExecutionChannel>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, ServerError> {
        let service = CodeExecutionService::new(config)?;
        Ok(Self {
            channel: Arc::new(CodeExecutionChannel::new(service)),
        })
    }

    pub fn service(&self) -> &CodeExecutionService {
        self.channel.service()
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check))
        .route("/languages", get(languages))
        .route("/channels/{channel}", post(invoke))
        .route("/execute", post(execute))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves, then stop the execution service.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state.clone());

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()));

    state.service().shutdown();
    result
}

pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<(), ServerError> {
    info!(
        "Starting code execution server on {} (channel {})",
        addr,
        state.channel.name()
    );
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_check() -> &'static str {
    "OK"
}

async fn languages(State(state): State<AppState>) -> Json<Vec<LanguageStatus>> {
    Json(state.service().languages())
}

async fn invoke(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(call): Json<MethodCall>,
) -> Result<Response, ServerError> {
    if channel != state.channel.name() {
        return Err(ServerError::UnknownChannel(channel));
    }

    let response = state.channel.handle(call).await;
    let status = match response {
        MethodResponse::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    Ok((status, Json(response)).into_response())
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecutionRequest>,
) -> Result<Json<ExecutionReply>, ServerError> {
    let result = state.service().execute(request).await?;
    Ok(Json(result.into()))
}
