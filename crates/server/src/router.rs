//! HTTP request router.
//!
//! Maps the API path prefixes onto the document operations in
//! [`crate::files`]. Each handler takes the decoded relative path, runs the
//! filesystem work on the blocking pool and serializes the result.
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /api/folders` | full tree |
//! | `GET /api/folder/<path>` | single-level listing |
//! | `GET /api/file/<path>` | file metadata and preview |
//! | `GET /documents/<path>` | raw bytes |
//! | `GET /healthz` | liveness |

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use protocol::{ErrorKind, ErrorResponse, FileMetadata, FolderListing, FolderTree, Health};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::files::{self, AccessError, PathResolver};

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "doccontrol";

/// Shared router state.
pub type AppState = Arc<PathResolver>;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Document access error.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The blocking task did not complete.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// HTTP status and wire category for this error.
    fn status(&self) -> (StatusCode, ErrorKind) {
        match self {
            RouterError::Access(e) => {
                let status = match e {
                    AccessError::Containment(_) => StatusCode::FORBIDDEN,
                    AccessError::NotFound(_) => StatusCode::NOT_FOUND,
                    AccessError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.kind())
            }
            RouterError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Io),
        }
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, status = %status, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type RouterResult<T> = Result<T, RouterError>;

/// Build the API router around a resolver.
pub fn build_router(resolver: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/folders", get(folder_tree))
        .route("/api/folder", get(root_listing))
        .route("/api/folder/", get(root_listing))
        .route("/api/folder/*path", get(folder_listing))
        .route("/api/file/", get(root_file_metadata))
        .route("/api/file/*path", get(file_metadata))
        .route("/documents/", get(root_raw_document))
        .route("/documents/*path", get(raw_document))
        .fallback(unknown_route)
        .with_state(resolver)
}

/// Serve the router on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, resolver: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(
        root = %resolver.root().path().display(),
        addr = %addr,
        "Document Control server listening"
    );

    axum::serve(listener, build_router(resolver))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Run filesystem work off the async reactor.
async fn run_blocking<T, F>(work: F) -> RouterResult<T>
where
    F: FnOnce() -> Result<T, AccessError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RouterError::Internal(e.to_string()))?
        .map_err(RouterError::from)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn folder_tree(State(resolver): State<AppState>) -> RouterResult<Json<FolderTree>> {
    let tree = run_blocking(move || Ok(files::folder_tree(&resolver))).await?;
    Ok(Json(tree))
}

async fn root_listing(State(resolver): State<AppState>) -> RouterResult<Json<FolderListing>> {
    let listing = run_blocking(move || files::folder_listing(&resolver, "")).await?;
    Ok(Json(listing))
}

async fn folder_listing(
    State(resolver): State<AppState>,
    Path(path): Path<String>,
) -> RouterResult<Json<FolderListing>> {
    let listing = run_blocking(move || files::folder_listing(&resolver, &path)).await?;
    Ok(Json(listing))
}

async fn root_file_metadata(State(resolver): State<AppState>) -> RouterResult<Json<FileMetadata>> {
    file_metadata(State(resolver), Path(String::new())).await
}

async fn file_metadata(
    State(resolver): State<AppState>,
    Path(path): Path<String>,
) -> RouterResult<Json<FileMetadata>> {
    let metadata = run_blocking(move || files::file_metadata(&resolver, &path)).await?;
    Ok(Json(metadata))
}

async fn root_raw_document(State(resolver): State<AppState>) -> RouterResult<Response> {
    raw_document(State(resolver), Path(String::new())).await
}

async fn raw_document(
    State(resolver): State<AppState>,
    Path(path): Path<String>,
) -> RouterResult<Response> {
    let raw = run_blocking(move || files::serve_raw_bytes(&resolver, &path)).await?;
    Ok(([(header::CONTENT_TYPE, raw.mime_type)], raw.bytes).into_response())
}

async fn unknown_route(uri: Uri) -> RouterError {
    RouterError::from(AccessError::NotFound(uri.path().to_string()))
}
