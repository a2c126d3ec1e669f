use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::stream::{SplitSink, StreamExt};
use futures_util::SinkExt;
use log::*;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Sink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// One envelope received from the server.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub payload: Value,
    pub timestamp: Instant,
}

pub struct Connection {
    pub label: String,
    sink: Sink,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(url: &str, label: String) -> Result<Self> {
        let (socket, _response) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to {url}"))?;
        let (sink, mut stream) = socket.split();
        let (tx, rx) = mpsc::unbounded_channel();

        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(envelope) = serde_json::from_str::<Value>(&text) else {
                            warn!("Non-JSON text frame for {}: {}", task_label, text);
                            continue;
                        };
                        let event = Event {
                            event_type: envelope["type"].as_str().unwrap_or_default().to_string(),
                            payload: envelope["payload"].clone(),
                            timestamp: Instant::now(),
                        };
                        debug!("{} received {}", task_label, event.event_type);

                        if tx.send(event).is_err() {
                            debug!("WebSocket receiver dropped for {}", task_label);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Server closed connection for {}: {:?}", task_label, frame);
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong frames are answered by tungstenite
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", task_label, e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended for {}", task_label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            label,
            sink,
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Sends a client message in the envelope format the server expects.
    pub async fn send(&mut self, message_type: &str, payload: Value) -> Result<()> {
        let envelope = json!({
            "type": message_type,
            "payload": payload,
            "timestamp": Utc::now(),
        });
        self.sink.send(Message::Text(envelope.to_string())).await?;
        Ok(())
    }

    pub async fn close(mut self) -> Result<()> {
        self.sink.close().await?;
        Ok(())
    }

    pub async fn wait_for_event(&mut self, event_type: &str, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for event: {}", event_type);
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type == event_type => {
                    return Ok(event);
                }
                Ok(Some(_)) => {
                    // Wrong event type, keep waiting
                    continue;
                }
                Ok(None) => {
                    anyhow::bail!("WebSocket connection closed");
                }
                Err(_) => {
                    anyhow::bail!("Timeout waiting for event: {}", event_type);
                }
            }
        }
    }
}
