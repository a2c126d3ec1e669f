use crate::connection::unix_nanos;
use crate::coordinator::Hub;
use crate::message::{Envelope, ErrorReport, Payload};
use events::{
    DashboardConfig, LogEntry, Notification, NotificationKind, SystemMetricsUpdate,
    WidgetStatusUpdate,
};
use log::*;
use serde_json::{Map, Value};
use std::fmt;

const CONFIG_NOTIFICATION_SECS: u32 = 5;
const WIDGET_NOTIFICATION_SECS: u32 = 3;
const SUCCESS_NOTIFICATION_SECS: u32 = 3;
const ERROR_NOTIFICATION_SECS: u32 = 10;

/// Typed producer entry points. Each wraps its record in an envelope stamped
/// with the current time and hands it to [`Hub::broadcast`].
impl Hub {
    pub fn broadcast_config_update(&self, config: DashboardConfig) {
        self.broadcast(Envelope::now(Payload::ConfigUpdate(config)));
    }

    pub fn broadcast_widget_status(&self, status: WidgetStatusUpdate) {
        self.broadcast(Envelope::now(Payload::WidgetStatus(status)));
    }

    pub fn broadcast_system_metrics(&self, metrics: SystemMetricsUpdate) {
        self.broadcast(Envelope::now(Payload::SystemMetrics(metrics)));
    }

    pub fn broadcast_log_entry(&self, entry: LogEntry) {
        self.broadcast(Envelope::now(Payload::LogEntry(entry)));
    }

    pub fn broadcast_notification(&self, notification: Notification) {
        self.broadcast(Envelope::now(Payload::Notification(notification)));
    }

    pub fn broadcast_error(&self, message: impl Into<String>, details: Map<String, Value>) {
        self.broadcast(Envelope::now(Payload::Error(ErrorReport {
            message: message.into(),
            details,
        })));
    }
}

/// Builds the stock toast notifications shown by the admin panel.
#[derive(Debug, Clone)]
pub struct MessageBroadcaster {
    hub: Hub,
}

impl MessageBroadcaster {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Announces a configuration change, then pushes the new configuration.
    pub fn notify_config_change(&self, config: DashboardConfig, change: &str) {
        self.notify(
            NotificationKind::Info,
            "Configuration Updated".to_string(),
            format!("Configuration {change} successfully"),
            CONFIG_NOTIFICATION_SECS,
        );
        self.hub.broadcast_config_update(config);
    }

    pub fn notify_widget_change(&self, name: &str, status: impl fmt::Display, message: &str) {
        self.notify(
            NotificationKind::Info,
            format!("Widget {status}"),
            format!("{name}: {message}"),
            WIDGET_NOTIFICATION_SECS,
        );
    }

    /// A persistent error stays on screen until dismissed (duration 0).
    pub fn notify_error(&self, title: &str, message: &str, persistent: bool) {
        let duration = if persistent { 0 } else { ERROR_NOTIFICATION_SECS };
        self.notify(
            NotificationKind::Error,
            title.to_string(),
            message.to_string(),
            duration,
        );
    }

    pub fn notify_success(&self, title: &str, message: &str) {
        self.notify(
            NotificationKind::Success,
            title.to_string(),
            message.to_string(),
            SUCCESS_NOTIFICATION_SECS,
        );
    }

    fn notify(&self, kind: NotificationKind, title: String, message: String, duration: u32) {
        debug!("Raising {kind:?} notification: {title}");
        self.hub.broadcast_notification(Notification {
            id: generate_notification_id(),
            kind,
            title,
            message,
            duration,
            actions: Vec::new(),
        });
    }
}

pub fn generate_notification_id() -> String {
    format!("notif_{}", unix_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::connection::{Connection, Outbox};
    use crate::message::Kind;
    use chrono::Utc;
    use events::{LogLevel, SystemMetrics, WidgetState};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    async fn subscribed_hub() -> (Hub, Outbox) {
        let hub = Hub::spawn(HubConfig::default());
        let (connection, mut outbox) = Connection::open(32, None);
        hub.register(connection);
        let welcome = next(&mut outbox).await;
        assert_eq!(welcome.kind(), Kind::ConnectionEstablished);
        (hub, outbox)
    }

    async fn next(outbox: &mut Outbox) -> Arc<Envelope> {
        tokio::time::timeout(Duration::from_secs(1), outbox.recv())
            .await
            .expect("timed out waiting for an envelope")
            .expect("outbound queue closed")
    }

    fn notification_of(envelope: &Envelope) -> &Notification {
        match envelope.payload() {
            Payload::Notification(n) => n,
            other => panic!("expected a notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn typed_broadcasts_carry_their_kind() {
        let (hub, mut outbox) = subscribed_hub().await;

        hub.broadcast_config_update(DashboardConfig::default());
        hub.broadcast_widget_status(WidgetStatusUpdate {
            widget_id: "clock".to_string(),
            widget_name: "Clock".to_string(),
            status: WidgetState::Active,
            last_execution: Utc::now(),
            execution_time_ms: 12,
            error: None,
            output: Some("12:30".to_string()),
        });
        hub.broadcast_system_metrics(SystemMetricsUpdate {
            timestamp: Utc::now(),
            metrics: SystemMetrics::default(),
        });
        hub.broadcast_log_entry(LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "render complete".to_string(),
            component: "renderer".to_string(),
            details: None,
        });
        hub.broadcast_error("script failed", Map::new());

        for expected in [
            Kind::ConfigUpdate,
            Kind::WidgetStatus,
            Kind::SystemMetrics,
            Kind::LogEntry,
            Kind::Error,
        ] {
            assert_eq!(next(&mut outbox).await.kind(), expected);
        }
    }

    #[tokio::test]
    async fn broadcast_error_serializes_message_and_details() {
        let (hub, mut outbox) = subscribed_hub().await;

        let mut details = Map::new();
        details.insert("widget".to_string(), json!("weather"));
        hub.broadcast_error("script failed", details);

        let value = serde_json::to_value(&*next(&mut outbox).await).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(
            value["payload"],
            json!({"message": "script failed", "details": {"widget": "weather"}})
        );
    }

    #[tokio::test]
    async fn config_change_notifies_then_pushes_the_config() {
        let (hub, mut outbox) = subscribed_hub().await;
        let broadcaster = MessageBroadcaster::new(hub);

        let mut config = DashboardConfig::default();
        config.title = "Kitchen".to_string();
        broadcaster.notify_config_change(config.clone(), "restored");

        let first = next(&mut outbox).await;
        let notification = notification_of(&first);
        assert_eq!(notification.kind, NotificationKind::Info);
        assert_eq!(notification.title, "Configuration Updated");
        assert_eq!(notification.message, "Configuration restored successfully");
        assert_eq!(notification.duration, 5);

        let second = next(&mut outbox).await;
        assert_eq!(second.payload(), &Payload::ConfigUpdate(config));
    }

    #[tokio::test]
    async fn widget_change_formats_title_and_message() {
        let (hub, mut outbox) = subscribed_hub().await;
        let broadcaster = MessageBroadcaster::new(hub);

        broadcaster.notify_widget_change("weather", WidgetState::Disabled, "disabled by user");

        let envelope = next(&mut outbox).await;
        let notification = notification_of(&envelope);
        assert_eq!(notification.title, "Widget disabled");
        assert_eq!(notification.message, "weather: disabled by user");
        assert_eq!(notification.duration, 3);
    }

    #[tokio::test]
    async fn persistent_errors_have_no_duration() {
        let (hub, mut outbox) = subscribed_hub().await;
        let broadcaster = MessageBroadcaster::new(hub);

        broadcaster.notify_error("Render failed", "display not found", true);
        broadcaster.notify_error("Render slow", "took 12s", false);
        broadcaster.notify_success("Saved", "Configuration saved");

        let persistent = next(&mut outbox).await;
        assert_eq!(notification_of(&persistent).kind, NotificationKind::Error);
        assert_eq!(notification_of(&persistent).duration, 0);

        let transient = next(&mut outbox).await;
        assert_eq!(notification_of(&transient).duration, 10);

        let success = next(&mut outbox).await;
        assert_eq!(notification_of(&success).kind, NotificationKind::Success);
        assert_eq!(notification_of(&success).duration, 3);
    }

    #[test]
    fn notification_ids_carry_the_notif_prefix() {
        let id = generate_notification_id();
        assert!(id.starts_with("notif_"));
        assert!(id["notif_".len()..].parse::<i64>().is_ok());
    }
}
