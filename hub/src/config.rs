use std::time::Duration;

/// Outbound queue capacity per connection.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Keepalive ping period, kept under the common 60s idle-connection timeout.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(54);
/// Rolling read deadline; reset by pongs and valid client messages.
pub const DEFAULT_READ_DEADLINE: Duration = Duration::from_secs(60);
/// Deadline applied to every frame write.
pub const DEFAULT_WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Tuning knobs shared by the coordinator and every connection's pumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub queue_capacity: usize,
    pub ping_interval: Duration,
    pub read_deadline: Duration,
    pub write_deadline: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            ping_interval: DEFAULT_PING_INTERVAL,
            read_deadline: DEFAULT_READ_DEADLINE,
            write_deadline: DEFAULT_WRITE_DEADLINE,
        }
    }
}
