//! Tracing subscriber setup

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log levels accepted on the command line
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Builds the filter: `level` is the default directive, `RUST_LOG` refines it
pub fn env_filter(level: &str) -> EnvFilter {
    let level = if LOG_LEVELS.contains(&level) { level } else { "info" };
    EnvFilter::builder()
        .with_default_directive(level.parse().unwrap_or_else(|_| LevelFilter::INFO.into()))
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default())
}

/// Installs the global stdout subscriber; panics if one is already set
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(env_filter(level)))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = env_filter("loud");
        assert!(filter.to_string().contains("info"));
    }

    #[test]
    fn test_known_level_is_used() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = env_filter("debug");
        assert!(filter.to_string().contains("debug"));
    }
}
