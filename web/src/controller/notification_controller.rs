use crate::controller::ApiResponse;
use crate::params::notification::CreateParams;
use crate::{AppState, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use events::AdminEvent;

use log::*;

/// POST broadcast a notification to every connected admin panel
#[utoipa::path(
    post,
    path = "/admin/notifications",
    request_body = CreateParams,
    responses(
        (status = 202, description = "Notification queued for every connected client", body = events::Notification),
        (status = 400, description = "Body is not JSON", body = crate::error::ErrorResponse),
        (status = 422, description = "Unprocessable Entity", body = crate::error::ErrorResponse),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    params: std::result::Result<Json<CreateParams>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(params) = params?;
    debug!("POST Broadcast notification: {params:?}");
    params.validate()?;

    let notification = params.into_notification();
    app_state
        .event_publisher
        .publish(AdminEvent::NotificationRaised(notification.clone()))
        .await;

    info!(
        "Notification {} sent to {} WebSocket client(s)",
        notification.id,
        app_state.hub.connection_count()
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(StatusCode::ACCEPTED.into(), notification)),
    ))
}
