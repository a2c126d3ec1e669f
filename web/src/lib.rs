use axum::http::{header, HeaderValue, Method};
use log::*;
pub use service::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
mod params;
pub(crate) mod router;
mod ws;

pub use error::{Error, Result};

/// Binds `interface:port` from the app config and serves the admin API and
/// WebSocket endpoint until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_string();
    let port = app_state.config.port;
    let listener = TcpListener::bind((host.as_str(), port)).await?;

    info!(
        "Server starting... listening for connections on http://{}:{} ({} environment)",
        host, port, app_state.config.runtime_env
    );

    serve(listener, app_state).await
}

/// Serves the application on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    let cors = cors_layer(&app_state.config.allowed_origins);
    let app = router::define_routes(app_state).layer(cors);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();
    debug!("CORS allowed origins: {origins:?}");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
