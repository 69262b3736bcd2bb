//! Company directory GraphQL server

use company_directory_graphql::{
    server::{create_router, shutdown_signal, AppState},
    store::Store,
    telemetry::init_tracing,
    AppConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        eprintln!("failed to load configuration: {}", e);
        e
    })?;
    init_tracing(&config.observability);

    let addr = config.bind_address();
    let state = AppState::new(Store::in_memory(), config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "company directory listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}
