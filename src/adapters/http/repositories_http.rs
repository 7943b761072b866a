//! Repositories HTTP server.
//!
//! Exposes `GET /repositories?count=N&unique=true&timeout=500ms`, translating
//! query parameters into a [`FetchRequest`] and an optional deadline on the
//! [`FetchContext`]. Records are returned as a JSON array; failures are
//! plain text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::FetchError;
use crate::domain::models::{FetchContext, FetchRequest, RepositoryRecord};
use crate::domain::ports::RepositoryService;

/// Raw query parameters; parsed by hand so errors read like the service's own.
#[derive(Debug, Default, Deserialize)]
pub struct RepositoriesQuery {
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub unique: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
}

impl RepositoriesQuery {
    /// Build the fetch request and optional timeout.
    pub fn parse(&self) -> Result<(FetchRequest, Option<Duration>), ApiError> {
        let mut request = FetchRequest::new();

        if let Some(raw) = non_empty(self.count.as_deref()) {
            let count: i64 = raw
                .parse()
                .map_err(|e| ApiError::bad_request(format!("invalid count {raw:?}: {e}")))?;
            let count = usize::try_from(count)
                .ok()
                .filter(|&c| c >= 1)
                .ok_or_else(|| {
                    ApiError::bad_request(format!("count must be at least 1, got {count}"))
                })?;
            request = request.with_count(count);
        }

        if non_empty(self.unique.as_deref()) == Some("true") {
            request = request.unique();
        }

        let timeout = match non_empty(self.timeout.as_deref()) {
            Some(raw) => Some(
                humantime::parse_duration(raw)
                    .map_err(|e| ApiError::bad_request(format!("invalid timeout {raw:?}: {e}")))?,
            ),
            None => None,
        };

        Ok((request, timeout))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Plain-text error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Application state
#[derive(Clone)]
struct AppState {
    service: Arc<dyn RepositoryService>,
}

/// Build the router serving `/repositories`.
pub fn router(service: Arc<dyn RepositoryService>) -> Router {
    Router::new()
        .route("/repositories", get(list_repositories))
        .with_state(AppState { service })
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<dyn RepositoryService>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, "repositories HTTP server listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("repositories HTTP server stopped");
    Ok(())
}

async fn list_repositories(
    State(state): State<AppState>,
    Query(query): Query<RepositoriesQuery>,
) -> Result<Json<Vec<RepositoryRecord>>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("repositories_request", %request_id);

    async move {
        let (request, timeout) = match query.parse() {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err.message, "rejected repositories request");
                return Err(err);
            }
        };

        let ctx = match timeout {
            Some(timeout) => FetchContext::background().with_timeout(timeout),
            None => FetchContext::background(),
        };

        match state.service.fetch_batch(&ctx, request).await {
            Ok(records) => {
                info!(
                    count = request.count,
                    unique = request.unique,
                    returned = records.len(),
                    "served repositories"
                );
                Ok(Json(records))
            }
            Err(err) => {
                warn!(error = %err, "repositories request failed");
                Err(err.into())
            }
        }
    }
    .instrument(span)
    .await
}
