use config::Config;
use events::EventPublisher;
use hub::{Hub, HubEventHandler, MessageBroadcaster};
use log::info;
use std::sync::Arc;
use std::time::Instant;

pub mod config;
pub mod logging;

/// Starts the WebSocket hub coordinator using the `ws_*` settings in `config`.
/// Must be called from within a tokio runtime.
pub fn init_hub(config: &Config) -> Hub {
    let hub_config = config.hub_config();
    info!(
        "WebSocket hub config: queue_capacity={}, ping_interval={}s, \
         read_deadline={}s, write_deadline={}s",
        hub_config.queue_capacity,
        hub_config.ping_interval.as_secs_f32(),
        hub_config.read_deadline.as_secs(),
        hub_config.write_deadline.as_secs(),
    );

    Hub::spawn(hub_config)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub hub: Hub,
    pub broadcaster: MessageBroadcaster,
    pub event_publisher: Arc<EventPublisher>,
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state around a running hub and wires the hub into the
    /// event publisher so admin events reach connected browsers.
    pub fn new(app_config: Config, hub: Hub) -> Self {
        let broadcaster = MessageBroadcaster::new(hub.clone());
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(HubEventHandler::new(broadcaster.clone())));

        Self {
            config: app_config,
            hub,
            broadcaster,
            event_publisher: Arc::new(event_publisher),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
