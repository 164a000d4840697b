use domain::ContentRepository;
use events::{EventBroadcaster, Producer};
use log::{error, info};
use service::config::BroadcastMode;
use service::{config::Config, logging::Logger, AppState};
use sse::transport::{LocalTransport, RedisTransport};
use sse::Manager;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    let repository = Arc::new(ContentRepository::new());
    let sse_manager = Arc::new(Manager::new());

    let broadcaster: Arc<dyn EventBroadcaster> = match config.broadcast_mode {
        BroadcastMode::Local => {
            info!("Broadcast transport: in-process");
            Arc::new(LocalTransport::new(sse_manager.clone()))
        }
        BroadcastMode::Redis => {
            info!("Broadcast transport: Redis [{}]", config.redis_url());
            let transport = match RedisTransport::new(config.redis_url()) {
                Ok(transport) => transport,
                Err(e) => {
                    error!("Failed to initialize Redis transport: {e}");
                    std::process::exit(1);
                }
            };
            transport.spawn_listener(sse_manager.clone());
            Arc::new(transport)
        }
    };

    let producer = Arc::new(Producer::new(broadcaster));
    let app_state = AppState::new(config.clone(), repository, sse_manager.clone(), producer);

    let router = web::define_routes(app_state);
    let address = config.api_address();

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {address}: {e}");
            std::process::exit(1);
        }
    };
    info!("Server starting... listening for requests on http://{address}");

    let serve_result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(sse_manager))
        .await;

    if let Err(e) = serve_result {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}

/// Resolves on ctrl-c and closes every open stream session so no
/// subscription outlives the server.
async fn shutdown_signal(sse_manager: Arc<Manager>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown signal handler: {e}");
        return;
    }
    info!("Shutdown signal received");
    sse_manager.shutdown();
}
