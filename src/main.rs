use std::sync::Arc;

use courtside_api::config;
use courtside_api::handlers;
use courtside_api::store::PostgresStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Courtside API in {:?} mode", config.environment);

    let store = PostgresStore::connect()
        .await
        .unwrap_or_else(|e| panic!("failed to connect record store: {}", e));

    let app = handlers::app(Arc::new(store));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Courtside API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
