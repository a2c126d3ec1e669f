use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use hub::{ConnectionInfo, HubCountersSnapshot};
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub websocket: WebSocketStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebSocketStatus {
    pub connected_clients: usize,
    pub clients: Vec<ConnectionInfo>,
    pub counters: HubCountersSnapshot,
}

/// GET overall server status including the WebSocket hub
#[utoipa::path(
    get,
    path = "/admin/status",
    responses(
        (status = 200, description = "Current server and WebSocket hub status", body = SystemStatus),
    )
)]
pub async fn status(State(app_state): State<AppState>) -> impl IntoResponse {
    let clients = app_state.hub.connection_info();
    debug!("GET system status ({} WebSocket client(s))", clients.len());

    Json(SystemStatus {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: app_state.uptime_secs(),
        websocket: WebSocketStatus {
            connected_clients: clients.len(),
            clients,
            counters: app_state.hub.counters(),
        },
    })
}

/// GET the currently connected WebSocket clients, oldest first
#[utoipa::path(
    get,
    path = "/admin/ws/clients",
    responses(
        (status = 200, description = "Connected WebSocket clients", body = [ConnectionInfo]),
    )
)]
pub async fn clients(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.hub.connection_info())
}
