use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::task;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinebook::{config::Config, controllers, services::LockReaper, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cinebook API");
    if config.settlement.mock_mode {
        warn!("Payment settlement is running in MOCK mode");
    }

    let state = AppState::new(config).await?;
    info!("Database connected, migrations applied");

    // Periodic sweep for expired seat locks
    let reaper = LockReaper::new(state.inventory.clone());
    task::spawn(reaper.run());

    let app = Router::new()
        .route("/", get(|| async { "Cinebook API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
