use crate::config::Config;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args};
use std::path::PathBuf;

// Global flags shared across every subcommand.
//
//   -c / --config        Path to a config.toml file
//   --host / --port      Rover endpoint overrides
//   --reconnect-delay    Seconds between reconnect attempts
//   --no-color           Disable coloured terminal output
//   -v / --verbose       Debug logging
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Path to a config.toml file (default: ~/.roverlink/config.toml)
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        env = "ROVERLINK_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Rover hostname or IP address
    #[arg(long, value_name = "HOST", env = "ROVERLINK_HOST", global = true)]
    pub host: Option<String>,

    /// Rover control-channel port
    #[arg(long, value_name = "PORT", env = "ROVERLINK_PORT", global = true)]
    pub port: Option<u16>,

    /// Seconds to wait before reconnecting
    #[arg(
        long,
        value_name = "SECS",
        env = "ROVERLINK_RECONNECT_DELAY",
        global = true
    )]
    pub reconnect_delay: Option<u64>,

    /// Disable coloured terminal output
    #[arg(
        long = "no-color",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        env = "NO_COLOR",
        global = true
    )]
    pub no_color: bool,

    /// Verbose (debug) logging
    #[arg(short = 'v', long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.rover.host = host.clone();
        }

        if let Some(port) = self.port {
            config.rover.port = port;
        }

        if let Some(delay) = self.reconnect_delay {
            config.link.reconnect_delay_secs = delay;
        }
    }
}
