use crate::connection::ConnectionId;
use crate::error::Error;
use chrono::{DateTime, Utc};
use events::{
    DashboardConfig, LogEntry, Notification, SystemMetricsUpdate, WidgetStatusUpdate,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Greeting carried by every `connection_established` envelope.
pub const WELCOME_MESSAGE: &str = "Connected to admin panel";

/// Every `type` tag that can appear on the wire, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    ConfigUpdate,
    WidgetStatus,
    SystemMetrics,
    LogEntry,
    Error,
    Notification,
    ConnectionEstablished,
    Ping,
    Pong,
    Subscribe,
    Unsubscribe,
    SubscriptionConfirmed,
    UnsubscriptionConfirmed,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::ConfigUpdate => "config_update",
            Kind::WidgetStatus => "widget_status",
            Kind::SystemMetrics => "system_metrics",
            Kind::LogEntry => "log_entry",
            Kind::Error => "error",
            Kind::Notification => "notification",
            Kind::ConnectionEstablished => "connection_established",
            Kind::Ping => "ping",
            Kind::Pong => "pong",
            Kind::Subscribe => "subscribe",
            Kind::Unsubscribe => "unsubscribe",
            Kind::SubscriptionConfirmed => "subscription_confirmed",
            Kind::UnsubscriptionConfirmed => "unsubscription_confirmed",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionEstablished {
    pub client_id: ConnectionId,
    pub server_time: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pong {
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionAck {
    /// Echoed exactly as the client sent them.
    pub topics: Vec<Value>,
    pub client_id: ConnectionId,
}

/// Server-originated payloads, one variant per `Kind` the server emits.
///
/// Serialized untagged: the tag lives next to the payload in the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    ConnectionEstablished(ConnectionEstablished),
    ConfigUpdate(DashboardConfig),
    WidgetStatus(WidgetStatusUpdate),
    SystemMetrics(SystemMetricsUpdate),
    LogEntry(LogEntry),
    Notification(Notification),
    Error(ErrorReport),
    Pong(Pong),
    SubscriptionConfirmed(SubscriptionAck),
    UnsubscriptionConfirmed(SubscriptionAck),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::ConnectionEstablished(_) => Kind::ConnectionEstablished,
            Payload::ConfigUpdate(_) => Kind::ConfigUpdate,
            Payload::WidgetStatus(_) => Kind::WidgetStatus,
            Payload::SystemMetrics(_) => Kind::SystemMetrics,
            Payload::LogEntry(_) => Kind::LogEntry,
            Payload::Notification(_) => Kind::Notification,
            Payload::Error(_) => Kind::Error,
            Payload::Pong(_) => Kind::Pong,
            Payload::SubscriptionConfirmed(_) => Kind::SubscriptionConfirmed,
            Payload::UnsubscriptionConfirmed(_) => Kind::UnsubscriptionConfirmed,
        }
    }
}

/// The unit of delivery. Immutable once built; a broadcast shares one instance
/// between every recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl Envelope {
    pub fn new(payload: Payload, timestamp: DateTime<Utc>) -> Self {
        Self { payload, timestamp }
    }

    /// Builds an envelope stamped with the current time.
    pub fn now(payload: Payload) -> Self {
        Self::new(payload, Utc::now())
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Serialize)]
struct WireEnvelope<'a> {
    #[serde(rename = "type")]
    kind: Kind,
    payload: &'a Payload,
    timestamp: &'a DateTime<Utc>,
}

impl Serialize for Envelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WireEnvelope {
            kind: self.kind(),
            payload: &self.payload,
            timestamp: &self.timestamp,
        }
        .serialize(serializer)
    }
}

/// Client-originated control messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Ping,
    /// `topics` is `None` when the payload carried no `topics` array.
    Subscribe { topics: Option<Vec<Value>> },
    Unsubscribe { topics: Option<Vec<Value>> },
    /// Well-formed frame with a `type` the server does not act on.
    Other(String),
}

#[derive(Deserialize)]
struct RawClientMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct TopicsPayload {
    topics: Vec<Value>,
}

impl ClientMessage {
    /// Decodes one text frame. Only frames that are not a JSON object with a
    /// string `type` fail; unknown types decode to `Other`.
    pub fn decode(text: &str) -> Result<Self, Error> {
        let raw: RawClientMessage = serde_json::from_str(text).map_err(Error::decode)?;

        let message = match raw.kind.as_str() {
            "ping" => ClientMessage::Ping,
            "subscribe" => ClientMessage::Subscribe {
                topics: topics_of(raw.payload),
            },
            "unsubscribe" => ClientMessage::Unsubscribe {
                topics: topics_of(raw.payload),
            },
            _ => ClientMessage::Other(raw.kind),
        };
        Ok(message)
    }
}

fn topics_of(payload: Value) -> Option<Vec<Value>> {
    serde_json::from_value::<TopicsPayload>(payload)
        .ok()
        .map(|p| p.topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use events::{NotificationKind, WidgetState};
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn envelope_serializes_type_payload_and_rfc3339_timestamp() {
        let envelope = Envelope::new(
            Payload::Notification(Notification {
                id: "notif_1".to_string(),
                kind: NotificationKind::Info,
                title: "Test".to_string(),
                message: "hello".to_string(),
                duration: 5,
                actions: vec![],
            }),
            fixed_time(),
        );

        let value: Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "notification",
                "payload": {
                    "id": "notif_1",
                    "type": "info",
                    "title": "Test",
                    "message": "hello",
                    "duration": 5
                },
                "timestamp": "2025-03-01T12:30:00Z"
            })
        );
    }

    #[test]
    fn kind_tag_follows_the_payload_variant() {
        let status = Envelope::now(Payload::WidgetStatus(WidgetStatusUpdate {
            widget_id: "weather".to_string(),
            widget_name: "Weather".to_string(),
            status: WidgetState::Error,
            last_execution: fixed_time(),
            execution_time_ms: 1200,
            error: Some("timeout".to_string()),
            output: None,
        }));
        assert_eq!(status.kind(), Kind::WidgetStatus);

        let ack = Envelope::now(Payload::UnsubscriptionConfirmed(SubscriptionAck {
            topics: vec![json!("logs")],
            client_id: ConnectionId::from("client_1"),
        }));
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value["type"], "unsubscription_confirmed");
        assert_eq!(value["payload"]["client_id"], "client_1");
        assert_eq!(value["payload"]["topics"], json!(["logs"]));
    }

    #[test]
    fn kind_strings_match_serde_names() {
        for kind in [
            Kind::ConfigUpdate,
            Kind::WidgetStatus,
            Kind::SystemMetrics,
            Kind::LogEntry,
            Kind::Error,
            Kind::Notification,
            Kind::ConnectionEstablished,
            Kind::Ping,
            Kind::Pong,
            Kind::Subscribe,
            Kind::Unsubscribe,
            Kind::SubscriptionConfirmed,
            Kind::UnsubscriptionConfirmed,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn decode_subscribe_with_topics() {
        let message = ClientMessage::decode(
            r#"{"type":"subscribe","payload":{"topics":["widget_status","logs"]},"timestamp":"2025-03-01T12:30:00Z"}"#,
        )
        .unwrap();

        assert_eq!(
            message,
            ClientMessage::Subscribe {
                topics: Some(vec![json!("widget_status"), json!("logs")])
            }
        );
    }

    #[test]
    fn decode_subscribe_keeps_topics_of_any_json_type() {
        let message =
            ClientMessage::decode(r#"{"type":"subscribe","payload":{"topics":[1,"a",null]}}"#)
                .unwrap();

        assert_eq!(
            message,
            ClientMessage::Subscribe {
                topics: Some(vec![json!(1), json!("a"), Value::Null])
            }
        );
    }

    #[test]
    fn decode_subscribe_without_topics_keeps_the_message() {
        let message = ClientMessage::decode(r#"{"type":"unsubscribe","payload":{}}"#).unwrap();
        assert_eq!(message, ClientMessage::Unsubscribe { topics: None });
    }

    #[test]
    fn decode_ping_without_payload_or_timestamp() {
        assert_eq!(
            ClientMessage::decode(r#"{"type":"ping"}"#).unwrap(),
            ClientMessage::Ping
        );
    }

    #[test]
    fn decode_unknown_type_is_not_an_error() {
        assert_eq!(
            ClientMessage::decode(r#"{"type":"resync","payload":null}"#).unwrap(),
            ClientMessage::Other("resync".to_string())
        );
    }

    #[test]
    fn decode_rejects_frames_without_a_type() {
        let err = ClientMessage::decode(r#"{"payload":{}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);

        let err = ClientMessage::decode("not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }
}
