//! Event system infrastructure for the Homeboard admin panel.
//!
//! This crate is the boundary between the components that change server-side
//! state (configuration store, widget executor, metrics collector, log sink)
//! and the infrastructure that tells connected admin browsers about it.
//!
//! # Architecture
//!
//! - **AdminEvent**: Enum representing every state change the admin panel cares about
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//! - **payload**: The typed records carried by events and, ultimately, by the wire envelope
//!
//! This crate has no dependencies on internal crates, so producers can depend on
//! it without pulling in the WebSocket hub.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod payload;

pub use payload::{
    DashboardConfig, LogEntry, LogLevel, Notification, NotificationAction, NotificationKind,
    SystemMetrics, SystemMetricsUpdate, Theme, WidgetConfig, WidgetState, WidgetStatusUpdate,
};

/// State changes emitted by admin-panel producers once an operation has completed.
#[derive(Debug, Clone)]
pub enum AdminEvent {
    /// The configuration was saved, restored or otherwise replaced.
    ConfigUpdated {
        config: DashboardConfig,
        /// Past-tense verb describing the change ("updated", "restored", ...).
        change: String,
    },
    /// The widget executor finished (or failed) a widget run.
    WidgetStatusChanged(WidgetStatusUpdate),
    MetricsSampled(SystemMetricsUpdate),
    LogRecorded(LogEntry),
    NotificationRaised(Notification),
    /// A server-side failure the operator should see.
    ErrorRaised {
        message: String,
        details: Map<String, Value>,
    },
}

impl AdminEvent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            AdminEvent::ConfigUpdated { .. } => "config_updated",
            AdminEvent::WidgetStatusChanged(_) => "widget_status_changed",
            AdminEvent::MetricsSampled(_) => "metrics_sampled",
            AdminEvent::LogRecorded(_) => "log_recorded",
            AdminEvent::NotificationRaised(_) => "notification_raised",
            AdminEvent::ErrorRaised { .. } => "error_raised",
        }
    }
}

/// Trait for handling admin events.
/// Implementations can perform side effects like pushing to browsers,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &AdminEvent);
}

/// Publishes admin events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: AdminEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &AdminEvent) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, event.name()));
        }
    }

    #[tokio::test]
    async fn publish_calls_handlers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(Recorder {
                label: "first",
                seen: seen.clone(),
            }))
            .with_handler(Arc::new(Recorder {
                label: "second",
                seen: seen.clone(),
            }));

        publisher
            .publish(AdminEvent::ConfigUpdated {
                config: DashboardConfig::default(),
                change: "updated".to_string(),
            })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:config_updated", "second:config_updated"]
        );
    }

    #[tokio::test]
    async fn with_handler_leaves_the_original_publisher_untouched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let base = EventPublisher::default();
        let extended = base.clone().with_handler(Arc::new(Recorder {
            label: "only",
            seen: seen.clone(),
        }));

        let event = AdminEvent::ConfigUpdated {
            config: DashboardConfig::default(),
            change: "updated".to_string(),
        };
        base.publish(event.clone()).await;
        assert!(seen.lock().unwrap().is_empty());

        extended.publish(event).await;
        assert_eq!(*seen.lock().unwrap(), vec!["only:config_updated"]);
    }
}
