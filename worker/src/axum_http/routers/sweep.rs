use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::{config::config_model::DotEnvyConfig, usecases::expire_access::ExpireAccessUseCase};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/sweep/run" \
//     -H "Authorization: Bearer $INTERNAL_SWEEP_TOKEN"

#[derive(Clone)]
pub struct SweepRouteState {
    config: Arc<DotEnvyConfig>,
    usecase: Arc<ExpireAccessUseCase>,
}

pub fn routes(config: Arc<DotEnvyConfig>, usecase: Arc<ExpireAccessUseCase>) -> Router {
    Router::new()
        .route("/run", post(run_sweep))
        .with_state(SweepRouteState { config, usecase })
}

#[derive(Debug, Serialize)]
pub struct RunSweepResponse {
    pub jobs_run: usize,
    pub scanned: usize,
    pub demoted: usize,
    pub grants_revoked: usize,
    pub failed: usize,
}

pub async fn run_sweep(State(state): State<SweepRouteState>, headers: HeaderMap) -> Response {
    let expected_token = match state.config.sweep.internal_token.as_deref() {
        Some(token) => token,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "sweep token is not configured",
            )
                .into_response();
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    match state.usecase.run(Utc::now()).await {
        Ok(outcome) => Json(RunSweepResponse {
            jobs_run: outcome.jobs_run,
            scanned: outcome.scanned,
            demoted: outcome.demoted,
            grants_revoked: outcome.grants_revoked,
            failed: outcome.failed,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "sweep: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "sweep failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
