use crate::controller::{
    health_check_controller, notification_controller, system_status_controller,
};
use crate::{params, ws, AppState};
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use utoipa::OpenApi;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Homeboard Admin API"
        ),
        paths(
            health_check_controller::health_check,
            system_status_controller::status,
            system_status_controller::clients,
            notification_controller::create,
        ),
        components(
            schemas(
                events::Notification,
                events::NotificationAction,
                events::NotificationKind,
                hub::ConnectionInfo,
                hub::HubCountersSnapshot,
                params::notification::CreateParams,
                system_status_controller::SystemStatus,
                system_status_controller::WebSocketStatus,
                crate::error::ErrorResponse,
            )
        ),
        tags(
            (name = "homeboard", description = "Homeboard dashboard administration API")
        )
    )]
pub(crate) struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(admin_routes(app_state.clone()))
        .merge(ws_routes(app_state))
        .merge(api_doc_routes())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(system_status_controller::status))
        .route("/admin/ws/clients", get(system_status_controller::clients))
        .route(
            "/admin/notifications",
            post(notification_controller::create),
        )
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/ws", get(ws::handler::ws_handler))
        .with_state(app_state)
}

fn api_doc_routes() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
