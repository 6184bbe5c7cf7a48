use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::storage::FileStore;

use super::{admin, handlers};

pub struct AppState {
    pub store: FileStore,
}

impl AppState {
    #[must_use]
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

/// Routes of the general file exchange service.
///
/// The axum default body limit would reject large uploads long before the
/// per-file ceiling applies, so it is lifted on the upload route and the
/// ceiling is enforced while the file streams through staging.
pub fn general_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/files/{namespace}", get(handlers::list_files))
        .route("/api/files/{namespace}/{name}", delete(handlers::delete_file))
        .route(
            "/api/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/download/{namespace}/{name}", get(handlers::download_file))
        .route("/api/download-all/{namespace}", get(handlers::download_all))
        .route("/api/view/{namespace}/{name}", get(handlers::view_file))
        .route("/api/preview/{namespace}/{name}", get(handlers::preview_file))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Routes of the admin service: server namespace only, bound separately.
pub fn admin_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/files/server", get(admin::list_files))
        .route(
            "/api/files/server/{name}",
            put(admin::update_file).delete(admin::delete_file),
        )
        .route("/api/download/server/{name}", get(admin::download_file))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
