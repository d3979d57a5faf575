use std::sync::Arc;

use chatrelay_rs::api;
use chatrelay_rs::config::{load_config, AppConfig};
use chatrelay_rs::observability::init_tracing;
use chatrelay_rs::state::AppState;
use chatrelay_rs::tools::builtin_registry;
use chatrelay_rs::transport::HttpTransport;
use tracing::info;

fn main() {
    let config = load_config("config.yaml").unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Please copy 'config.example.yaml' to 'config.yaml' and modify as needed.");
        std::process::exit(1);
    });

    init_tracing(&config.features.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize Tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(async move {
        run(config).await;
    });
}

async fn run(config: AppConfig) {
    let transport = HttpTransport::new(&config.server).unwrap_or_else(|e| {
        eprintln!("Failed to build upstream transport: {e}");
        std::process::exit(1);
    });
    let tools = builtin_registry().unwrap_or_else(|e| {
        eprintln!("Failed to build tool registry: {e}");
        std::process::exit(1);
    });

    let host = config.server.host.clone();
    let port = config.server.port;
    let integration = config.upstream.integration;
    let model = config.upstream.model.clone();

    let state = Arc::new(AppState::new(config, transport, Arc::new(tools)));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to bind {host}:{port}: {e}");
            std::process::exit(1);
        });

    info!(
        host = host.as_str(),
        port,
        integration = %integration,
        model = model.as_str(),
        "chatrelay listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
