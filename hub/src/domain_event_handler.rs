use crate::broadcast::MessageBroadcaster;
use async_trait::async_trait;
use events::{AdminEvent, EventHandler};
use log::*;

/// Handles admin events by turning them into WebSocket broadcasts.
///
/// Configuration changes are announced with a notification before the new
/// configuration is pushed; every other event maps onto exactly one envelope.
pub struct HubEventHandler {
    broadcaster: MessageBroadcaster,
}

impl HubEventHandler {
    pub fn new(broadcaster: MessageBroadcaster) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl EventHandler for HubEventHandler {
    async fn handle(&self, event: &AdminEvent) {
        debug!("Handling {} event", event.name());
        let hub = self.broadcaster.hub();

        match event {
            AdminEvent::ConfigUpdated { config, change } => {
                self.broadcaster.notify_config_change(config.clone(), change);
            }
            AdminEvent::WidgetStatusChanged(status) => {
                hub.broadcast_widget_status(status.clone());
            }
            AdminEvent::MetricsSampled(metrics) => {
                hub.broadcast_system_metrics(metrics.clone());
            }
            AdminEvent::LogRecorded(entry) => {
                hub.broadcast_log_entry(entry.clone());
            }
            AdminEvent::NotificationRaised(notification) => {
                hub.broadcast_notification(notification.clone());
            }
            AdminEvent::ErrorRaised { message, details } => {
                hub.broadcast_error(message.clone(), details.clone());
            }
        }
    }
}
