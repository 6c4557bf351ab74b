//! Command-line interface parsing for the shrine proxy
//!
//! `serve` (the default) runs the HTTP server with the in-memory cache and
//! background refresh. `fetch` runs the pipeline once and writes the snapshot
//! file, for cron jobs and static hosting.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::logging::LOG_LEVELS;

/// Caching proxy for the weekly Dead by Daylight shrine
#[derive(Parser, Debug)]
#[command(name = "shrine-proxy")]
#[command(about = "Caching proxy for the weekly shrine, enriched with perk metadata")]
#[command(version)]
pub struct Cli {
    /// Comma-separated shrine source URLs, tried in order (overrides the built-in mirrors)
    #[arg(long, env = "SHRINE_SOURCES", value_delimiter = ',', global = true)]
    pub sources: Vec<String>,

    /// Where the snapshot file is written and served from
    #[arg(long, env = "SHRINE_SNAPSHOT_FILE", value_name = "PATH", global = true)]
    pub snapshot_file: Option<PathBuf>,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, default_value = "info", value_parser = LOG_LEVELS, global = true)]
    pub log_level: String,

    // Server options used when no subcommand is given; `serve` takes its own
    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the shrine over HTTP (default)
    Serve(ServeArgs),
    /// Fetch the shrine once and write the snapshot file
    Fetch,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Listen on all interfaces instead of localhost only
    #[arg(long)]
    pub bind_all: bool,

    /// Answer 500 instead of serving the previous snapshot when a refresh fails
    #[arg(long)]
    pub strict: bool,
}

pub const DEFAULT_PORT: u16 = 3000;

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_all: false,
            strict: false,
        }
    }
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        let ip = if self.bind_all {
            Ipv4Addr::UNSPECIFIED
        } else {
            Ipv4Addr::LOCALHOST
        };
        SocketAddr::from((ip, self.port))
    }
}

impl Cli {
    /// The subcommand to run, `serve` with the top-level server options when none was given
    pub fn action(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(self.serve.clone()))
    }

    pub fn config(&self) -> Config {
        Config::new(&self.sources, self.snapshot_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SHRINE_SOURCES;

    #[test]
    fn test_cli_parse_no_args_defaults_to_serve() {
        let cli = Cli::parse_from(["shrine-proxy"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.action(), Command::Serve(ServeArgs::default()));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_parse_serve_flags() {
        let cli = Cli::parse_from(["shrine-proxy", "serve", "--port", "8080", "--bind-all", "--strict"]);
        assert_eq!(
            cli.action(),
            Command::Serve(ServeArgs {
                port: 8080,
                bind_all: true,
                strict: true,
            })
        );
    }

    #[test]
    fn test_bare_invocation_accepts_server_flags() {
        let cli = Cli::parse_from(["shrine-proxy", "--port", "8089", "--strict"]);
        assert!(cli.command.is_none());
        assert_eq!(
            cli.action(),
            Command::Serve(ServeArgs {
                port: 8089,
                bind_all: false,
                strict: true,
            })
        );
    }

    #[test]
    fn test_cli_parse_comma_separated_sources() {
        let cli = Cli::parse_from(["shrine-proxy", "--sources", "https://a/shrine,https://b/shrine", "fetch"]);
        assert_eq!(cli.sources, vec!["https://a/shrine", "https://b/shrine"]);
        assert_eq!(cli.action(), Command::Fetch);
        assert_eq!(cli.config().shrine_sources, cli.sources);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["shrine-proxy", "fetch", "--snapshot-file", "/tmp/s.json"]);
        assert_eq!(cli.config().snapshot_file, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_config_without_sources_uses_defaults() {
        let cli = Cli::parse_from(["shrine-proxy", "--sources", ""]);
        assert_eq!(cli.config().shrine_sources[0], DEFAULT_SHRINE_SOURCES[0]);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["shrine-proxy", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_serve_addr() {
        let local = ServeArgs::default().addr();
        assert!(local.ip().is_loopback());
        assert_eq!(local.port(), DEFAULT_PORT);

        let all = ServeArgs {
            bind_all: true,
            ..Default::default()
        };
        assert!(all.addr().ip().is_unspecified());
    }
}
