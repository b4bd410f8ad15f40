use crate::api::api_error::APIError;
use crate::api::auth::{self, Authenticated};
use crate::api::model::{AddRecordRequest, RemoveRecordRequest};
use crate::api::server::AppState;
use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

const OK_BODY: &str = "OK\n";

/// Build the API [`Router`] for the given state.
pub fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/api/v1/micetro", post(add).delete(remove))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

// The reconciliation runs on its own task so that a timed out or abandoned request doesn't
// cancel backend calls that are already in flight.
async fn add(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    WithRejection(Json(payload), _): WithRejection<Json<AddRecordRequest>, APIError>,
) -> Result<&'static str, APIError> {
    tracing::debug!("request = {payload:?}");
    let operation = async move {
        state
            .micetro
            .add_txt_records(
                &principal,
                payload.zone.as_deref(),
                payload.name.as_deref(),
                payload.data.as_deref(),
            )
            .await
    };
    tokio::spawn(operation.in_current_span()).await??;
    Ok(OK_BODY)
}

async fn remove(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    WithRejection(Json(payload), _): WithRejection<Json<RemoveRecordRequest>, APIError>,
) -> Result<&'static str, APIError> {
    tracing::debug!("request = {payload:?}");
    let operation = async move {
        state
            .micetro
            .remove_txt_records(&principal, payload.zone.as_deref(), payload.name.as_deref())
            .await
    };
    tokio::spawn(operation.in_current_span()).await??;
    Ok(OK_BODY)
}
