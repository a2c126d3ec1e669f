use log::*;
use service::{config::Config, init_hub, logging, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = logging::init(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting Homeboard admin server v{} ({} environment)",
        env!("CARGO_PKG_VERSION"),
        config.runtime_env()
    );

    let hub = init_hub(&config);
    let app_state = AppState::new(config, hub);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
