mod config;
mod render;
mod routes;
mod state;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feature_matrix::MatrixSession;

use crate::config::{matrix_config, ServerConfig};
use crate::render::Renderer;
use crate::routes::create_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "feature_matrix_web=info,feature_matrix=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env();
    let renderer = Renderer::new()?;

    // Single load at startup; a failure leaves the server up in error mode
    let app_state = match matrix_config(|key| std::env::var(key).ok(), &server.static_dir) {
        Ok(config) => {
            info!("Loading feature data from {}", config.dataset);
            match MatrixSession::load(&config).await {
                Ok(session) => AppState::ready(session, renderer),
                Err(e) => {
                    error!("Failed to load feature data: {}", e);
                    AppState::failed(e.code(), e.to_string(), renderer)
                }
            }
        }
        Err(e) => {
            error!("Invalid configuration: {}", e);
            AppState::failed("CONFIG", e.to_string(), renderer)
        }
    };

    let app = create_router(app_state, &server.static_dir);

    let addr = format!("0.0.0.0:{}", server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
