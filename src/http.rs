//! HTTP API over the aggregated snapshot.

use std::sync::Arc;

use aggregator::{PollQueries, SnapshotCache};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use common::{CandidateResult, Error, RegionSnapshot};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub queries: PollQueries,
    pub cache: Arc<SnapshotCache>,
}

/// HTTP API server for poll snapshots.
pub struct ApiServer {
    bind_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(bind_addr: String, queries: PollQueries, cache: Arc<SnapshotCache>) -> Self {
        let state = ApiState { queries, cache };
        Self { bind_addr, state }
    }

    /// Bind the listener and serve requests until the task is stopped.
    pub async fn serve(self) -> Result<(), Error> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind {}: {}", self.bind_addr, e)))?;

        info!("API listening on http://{}", self.bind_addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(format!("API server exited: {}", e)))
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/regions", get(list_regions))
            .route("/regions/:code", get(get_region))
            .route("/results", get(list_results))
            .route("/results/:candidate", get(get_result))
            .route("/health", get(health))
            .with_state(self.state.clone())
    }
}

/// Refresh failures surface as 502: the server is healthy but could not
/// produce a current snapshot.
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Upstream(_) | Error::Malformed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn list_regions(
    State(state): State<ApiState>,
) -> Result<Json<Vec<RegionSnapshot>>, StatusCode> {
    match state.queries.regions().await {
        Ok(aggregate) => Ok(Json(aggregate.as_ref().clone())),
        Err(e) => {
            warn!("GET /regions failed: {e}");
            Err(error_status(&e))
        }
    }
}

async fn get_region(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> Result<Json<RegionSnapshot>, StatusCode> {
    match state.queries.region(&code).await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!("GET /regions/{code} failed: {e}");
            Err(error_status(&e))
        }
    }
}

async fn list_results(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CandidateResult>>, StatusCode> {
    match state.queries.results().await {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            warn!("GET /results failed: {e}");
            Err(error_status(&e))
        }
    }
}

async fn get_result(
    State(state): State<ApiState>,
    Path(candidate): Path<String>,
) -> Result<Json<CandidateResult>, StatusCode> {
    match state.queries.result(&candidate).await {
        Ok(Some(line)) => Ok(Json(line)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!("GET /results/{candidate} failed: {e}");
            Err(error_status(&e))
        }
    }
}

/// Liveness plus cache freshness. Never triggers a refresh, so it stays
/// cheap and answers even when the upstream feed is down.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    let status = state.cache.status().await;
    Json(json!({
        "status": "ok",
        "has_data": status.has_data,
        "regions": status.regions,
        "age_secs": status.age_secs,
        "refreshed_at": status.refreshed_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_failures_map_to_bad_gateway() {
        assert_eq!(
            error_status(&Error::Upstream("feed down".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&Error::Malformed("bad json".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&Error::Server("bind failed".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
