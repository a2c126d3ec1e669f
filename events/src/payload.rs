//! Payload records exchanged between event producers and the hub.
//!
//! These types describe the boundary with the collaborators that own the
//! underlying state (configuration store, widget executor, metrics collector).
//! The hub does not validate them; it only serializes them onto the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Dashboard configuration as last persisted by the configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Dashboard refresh interval in minutes.
    pub refresh_interval: u32,
    pub server_port: u16,
    pub widgets: Vec<WidgetConfig>,
    pub title: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub name: String,
    pub script: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Execution timeout in seconds.
    pub timeout: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: String,
    pub background: String,
    pub foreground: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 15,
            server_port: 8080,
            widgets: Vec::new(),
            title: "E-Paper Dashboard".to_string(),
            theme: Theme::default(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            font_size: "16px".to_string(),
            background: "#ffffff".to_string(),
            foreground: "#000000".to_string(),
        }
    }
}

/// Runtime state reported by the widget executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    Active,
    Disabled,
    Error,
    Idle,
}

impl std::fmt::Display for WidgetState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WidgetState::Active => write!(f, "active"),
            WidgetState::Disabled => write!(f, "disabled"),
            WidgetState::Error => write!(f, "error"),
            WidgetState::Idle => write!(f, "idle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetStatusUpdate {
    pub widget_id: String,
    pub widget_name: String,
    pub status: WidgetState,
    pub last_execution: DateTime<Utc>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub request_count: i64,
    pub error_count: i64,
    pub average_latency: f64,
    /// Seconds since the process started.
    pub total_uptime: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetricsUpdate {
    pub timestamp: DateTime<Utc>,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

/// A toast shown by the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Display time in seconds, 0 keeps the notification until dismissed.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationAction {
    pub label: String,
    pub action: String,
    /// One of "primary", "secondary" or "danger".
    pub style: String,
}
