//! The two tasks that drive a single WebSocket session.
//!
//! The outbound pump is the only writer to the socket. It drains the
//! connection's queue and sends keepalive pings. The inbound pump is the only
//! reader; it enforces the read deadline and answers control messages through
//! the connection's [`Replier`].
//!
//! Either pump exiting unregisters the connection. Because the socket is split,
//! only the outbound pump holds the write half, so it is the one that closes
//! the socket: when its queue closes, when a write fails, or when the inbound
//! pump reports that it has stopped reading.

use crate::config::HubConfig;
use crate::connection::{ConnectionKey, Outbox, Replier};
use crate::coordinator::Hub;
use crate::error::Error;
use crate::message::{ClientMessage, Envelope, Payload, Pong, SubscriptionAck};
use axum::extract::ws::Message;
use chrono::Utc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::*;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, timeout, timeout_at, Instant, MissedTickBehavior};

/// Writes queued envelopes and periodic pings to `sink` until the queue
/// closes, a write fails or `reader_done` resolves, then closes the sink and
/// unregisters `key`.
pub async fn outbound<S>(
    mut sink: S,
    mut outbox: Outbox,
    mut reader_done: oneshot::Receiver<()>,
    hub: Hub,
    key: ConnectionKey,
    config: &HubConfig,
) where
    S: Sink<Message> + Unpin,
    S::Error: StdError + Send + Sync + 'static,
{
    let mut ticker = interval_at(
        Instant::now() + config.ping_interval,
        config.ping_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let id = key.id().clone();

    loop {
        tokio::select! {
            _ = &mut reader_done => {
                debug!("WebSocket connection {id} stopped reading; closing");
                let _ = write(&mut sink, Message::Close(None), config.write_deadline).await;
                break;
            }
            next = outbox.recv() => {
                let Some(envelope) = next else {
                    // The hub dropped this connection.
                    let _ = write(&mut sink, Message::Close(None), config.write_deadline).await;
                    break;
                };

                let text = match envelope.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize {} envelope for {id}: {e}", envelope.kind());
                        continue;
                    }
                };

                if let Err(e) = write(&mut sink, Message::Text(text), config.write_deadline).await {
                    warn!("Write to WebSocket connection {id} failed: {e}");
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Err(e) = write(&mut sink, Message::Ping(Vec::new()), config.write_deadline).await {
                    warn!("Keepalive ping to WebSocket connection {id} failed: {e}");
                    break;
                }
                trace!("Sent keepalive ping to {id}");
            }
        }
    }

    if timeout(config.write_deadline, sink.close()).await.is_err() {
        debug!("Timed out closing WebSocket connection {id}");
    }
    hub.unregister(key);
}

/// Reads client frames from `stream` until the peer goes away, a read fails,
/// or nothing valid arrives within `read_deadline`, then unregisters the
/// connection.
pub async fn inbound<St, E>(mut stream: St, replier: Replier, hub: Hub, read_deadline: Duration)
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let key = replier.key().clone();
    let id = key.id();
    let mut deadline = Instant::now() + read_deadline;

    loop {
        let frame = match timeout_at(deadline, stream.next()).await {
            Err(_) => {
                info!("WebSocket connection {id} missed its read deadline");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!("Read from WebSocket connection {id} failed: {e}");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => match ClientMessage::decode(&text) {
                Ok(message) => {
                    deadline = Instant::now() + read_deadline;
                    handle_client_message(message, &replier);
                }
                Err(e) => warn!("Ignoring message from {id}: {e}"),
            },
            Message::Pong(_) | Message::Ping(_) => {
                deadline = Instant::now() + read_deadline;
            }
            Message::Binary(data) => {
                debug!("Ignoring {} byte binary frame from {id}", data.len());
            }
            Message::Close(_) => {
                debug!("WebSocket connection {id} sent close");
                break;
            }
        }
    }

    hub.unregister(key);
}

fn handle_client_message(message: ClientMessage, replier: &Replier) {
    let id = replier.id();

    match message {
        ClientMessage::Ping => {
            replier.reply(Envelope::now(Payload::Pong(Pong {
                timestamp: Utc::now(),
            })));
        }
        ClientMessage::Subscribe { topics: Some(topics) } => {
            debug!("Client {id} subscribed to {topics:?}");
            replier.reply(Envelope::now(Payload::SubscriptionConfirmed(
                SubscriptionAck {
                    topics,
                    client_id: id.clone(),
                },
            )));
        }
        ClientMessage::Unsubscribe { topics: Some(topics) } => {
            debug!("Client {id} unsubscribed from {topics:?}");
            replier.reply(Envelope::now(Payload::UnsubscriptionConfirmed(
                SubscriptionAck {
                    topics,
                    client_id: id.clone(),
                },
            )));
        }
        ClientMessage::Subscribe { topics: None } | ClientMessage::Unsubscribe { topics: None } => {
            debug!("Ignoring subscription change without topics from {id}");
        }
        ClientMessage::Other(kind) => {
            debug!("Unhandled message type from {id}: {kind}");
        }
    }
}

async fn write<S>(sink: &mut S, message: Message, deadline: Duration) -> Result<(), Error>
where
    S: Sink<Message> + Unpin,
    S::Error: StdError + Send + Sync + 'static,
{
    match timeout(deadline, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::transport(e)),
        Err(_) => Err(Error::timeout()),
    }
}
