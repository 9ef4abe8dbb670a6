//! # biolink web
//!
//! axum service in front of the page directory.
//!
//! - `/api/pages/...`  editor JSON API (pages, items inside folders, testimonials)
//! - `/api/public/...` visitor view and link following as JSON
//! - `/p/:slug`        server-rendered public page
//! - `/api/suggest/*`  generated bio and link title suggestions

pub mod error;
pub mod handlers;
pub mod state;
pub mod templates;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let editor_routes = Router::new()
        .route("/api/pages", get(handlers::list_pages).post(handlers::create_page))
        .route(
            "/api/pages/:id",
            get(handlers::editor_view)
                .put(handlers::update_page)
                .delete(handlers::delete_page),
        )
        .route("/api/pages/:id/items", post(handlers::insert_item))
        .route("/api/pages/:id/items/move", post(handlers::move_item))
        .route(
            "/api/pages/:id/items/:item",
            axum::routing::patch(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/api/pages/:id/testimonials", get(handlers::page_testimonials));

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/public/:slug", get(handlers::public_view))
        .route("/api/public/:slug/follow", post(handlers::follow))
        .route("/p/:slug", get(handlers::public_page))
        .route("/p/:slug/go/:link", post(handlers::public_go));

    let suggest_routes = Router::new()
        .route("/api/suggest/bio", post(handlers::suggest_bio))
        .route("/api/suggest/title", post(handlers::suggest_title));

    Router::new()
        .merge(editor_routes)
        .merge(public_routes)
        .merge(suggest_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("biolink listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
