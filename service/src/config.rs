use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use hub::HubConfig;
use log::{warn, LevelFilter};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,http://localhost:8080"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8080)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Number of envelopes buffered per WebSocket client before it is dropped as too slow
    #[arg(long, env, default_value_t = hub::config::DEFAULT_QUEUE_CAPACITY)]
    pub ws_queue_capacity: usize,

    /// Seconds between keepalive pings sent to each WebSocket client
    #[arg(long, env, default_value_t = 54)]
    pub ws_ping_interval_secs: u64,

    /// Seconds a WebSocket client may stay silent (no pong, no message) before it is disconnected
    #[arg(long, env, default_value_t = 60)]
    pub ws_read_deadline_secs: u64,

    /// Seconds allowed for a single WebSocket frame write
    #[arg(long, env, default_value_t = 10)]
    pub ws_write_deadline_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }

    /// WebSocket hub tuning derived from the `ws_*` settings.
    ///
    /// The ping interval must be shorter than the read deadline or healthy
    /// clients would be dropped between keepalives; a longer one is clamped to
    /// nine tenths of the deadline.
    pub fn hub_config(&self) -> HubConfig {
        let read_deadline = Duration::from_secs(self.ws_read_deadline_secs.max(1));
        let mut ping_interval = Duration::from_secs(self.ws_ping_interval_secs.max(1));

        if ping_interval >= read_deadline {
            let clamped = read_deadline * 9 / 10;
            warn!(
                "ws_ping_interval_secs ({}s) must be below ws_read_deadline_secs ({}s); using {}ms",
                ping_interval.as_secs(),
                read_deadline.as_secs(),
                clamped.as_millis()
            );
            ping_interval = clamped;
        }

        HubConfig {
            queue_capacity: self.ws_queue_capacity.max(1),
            ping_interval,
            read_deadline,
            write_deadline: Duration::from_secs(self.ws_write_deadline_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["homeboard"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn hub_config_uses_websocket_settings() {
        let config = parse(&[
            "--ws-queue-capacity",
            "32",
            "--ws-ping-interval-secs",
            "20",
            "--ws-read-deadline-secs",
            "30",
            "--ws-write-deadline-secs",
            "5",
        ]);

        assert_eq!(
            config.hub_config(),
            HubConfig {
                queue_capacity: 32,
                ping_interval: Duration::from_secs(20),
                read_deadline: Duration::from_secs(30),
                write_deadline: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn ping_interval_is_clamped_below_read_deadline() {
        let config = parse(&[
            "--ws-ping-interval-secs",
            "90",
            "--ws-read-deadline-secs",
            "60",
        ]);

        let hub_config = config.hub_config();
        assert_eq!(hub_config.read_deadline, Duration::from_secs(60));
        assert_eq!(hub_config.ping_interval, Duration::from_secs(54));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let config = parse(&["--ws-queue-capacity", "0"]);
        assert_eq!(config.hub_config().queue_capacity, 1);
    }

    #[test]
    fn allowed_origins_are_comma_delimited() {
        let config = parse(&[
            "--allowed-origins",
            "http://dashboard.local,https://dashboard.local",
        ]);
        assert_eq!(
            config.allowed_origins,
            vec!["http://dashboard.local", "https://dashboard.local"]
        );
    }

    #[test]
    fn runtime_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }
}
