//! Decision API routes

use crate::acl::{AclDecision, AclEngine, TrustSource};
use crate::config::ServerConfig;
use crate::error::AclError;
use crate::event::Event;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared state for decision handlers
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<AclEngine>,
    /// Parent of every per-request cancellation token
    pub shutdown: CancellationToken,
    pub decision_timeout: Duration,
}

impl ServerState {
    pub fn new(engine: Arc<AclEngine>, config: &ServerConfig, shutdown: CancellationToken) -> Self {
        Self {
            engine,
            shutdown,
            decision_timeout: Duration::from_secs(config.decision_timeout_secs),
        }
    }
}

/// Body of a successful decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<TrustSource>,
}

impl From<AclDecision> for DecisionResponse {
    fn from(decision: AclDecision) -> Self {
        match decision {
            AclDecision::Allowed { login, source } => Self {
                allowed: true,
                login: Some(login),
                source: Some(source),
            },
            AclDecision::Denied => Self {
                allowed: false,
                login: None,
                source: None,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// A decision that could not be reached
struct DecisionError(AclError);

impl IntoResponse for DecisionError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AclError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            AclError::Provider(_) | AclError::Policy(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the decision API router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/decisions", post(decide))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn decide(
    State(state): State<ServerState>,
    Json(event): Json<Event>,
) -> Result<Json<DecisionResponse>, DecisionError> {
    let cancel = state.shutdown.child_token();

    let result = tokio::select! {
        result = state.engine.decide(&cancel, &event) => result,
        _ = tokio::time::sleep(state.decision_timeout) => {
            cancel.cancel();
            warn!(
                repo = %event.full_name(),
                timeout_secs = state.decision_timeout.as_secs(),
                "Decision timed out"
            );
            Err(AclError::Cancelled)
        }
    };

    match result {
        Ok(decision) => Ok(Json(decision.into())),
        Err(e) => {
            error!(repo = %event.full_name(), sender = %event.sender, error = %e, "Decision failed");
            Err(DecisionError(e))
        }
    }
}
