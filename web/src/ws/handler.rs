use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use log::*;
use service::AppState;
use std::net::SocketAddr;

/// Upgrades an admin-panel request to a WebSocket session served by the hub.
/// One session per browser tab; it lasts until either side goes away.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    debug!("Upgrading admin WebSocket request from {remote_addr}");

    let hub = app_state.hub.clone();
    ws.on_upgrade(move |socket| hub::serve(hub, socket, Some(remote_addr)))
}
