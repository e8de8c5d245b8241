pub mod api;
pub mod pages;

use std::path::Path;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::state::AppState;

pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .merge(api::router())
        // Stylesheet and the bundled dataset
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
