//! Terminal logging for the admin server.
//!
//! Hub lifecycle lines (connect, disconnect, eviction) are the main thing an
//! operator reads, so the WebSocket and HTTP stacks underneath are muted unless
//! the level is TRACE.

use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Frame-level chatter from the WebSocket stack and the HTTP server.
const NOISY_MODULES: &[&str] = &["tokio_tungstenite", "tungstenite", "tower", "hyper", "axum"];

/// Installs the global terminal logger. Fails if a logger is already installed.
pub fn init(config: &Config) -> Result<(), SetLoggerError> {
    TermLogger::init(
        config.log_level_filter,
        log_config(config.log_level_filter),
        TerminalMode::Mixed,
        color_choice(config.is_production()),
    )
}

fn muted_modules(level: LevelFilter) -> &'static [&'static str] {
    if level == LevelFilter::Trace {
        &[]
    } else {
        NOISY_MODULES
    }
}

// Production output usually lands in a log collector, not a terminal.
fn color_choice(production: bool) -> ColorChoice {
    if production {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn log_config(level: LevelFilter) -> simplelog::Config {
    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    for module in muted_modules(level) {
        builder.add_filter_ignore_str(module);
    }
    builder.build()
}
