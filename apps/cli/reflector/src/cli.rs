use crate::error::CliError;
use crate::logger::LoggerSettings;

use daemon_client::config::ClientConfig;
use models::EPHEMERAL_LOCAL_ADDR;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const LOG_DIR_NAME: &str = "logs";

#[derive(Parser, Debug)]
#[command(
    name = "reflector",
    about = "Drive a local reflector daemon from the command line",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Directory holding client.json (defaults to the platform config directory).
    #[arg(long, env = "REFLECTOR_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Daemon API base URL, overrides the config file.
    #[arg(long, env = "REFLECTOR_API", global = true)]
    pub api: Option<String>,

    /// Scope name shown in the daemon, overrides the config file.
    #[arg(long, env = "REFLECTOR_NAME", global = true)]
    pub name: Option<String>,

    /// Directory for reflector.log (defaults to <config-dir>/logs).
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Keep log lines off the console; reflector.log is still written.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a default client.json.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Connect and follow state and pool changes until interrupted.
    Watch,

    /// Print the daemon's instance pool.
    List,

    /// Create an instance tunnelling a local address to a remote WebSocket.
    Add {
        /// Remote WebSocket URL.
        #[arg(long)]
        remote: String,

        /// Local bind address; port 0 lets the daemon pick one.
        #[arg(long, default_value = EPHEMERAL_LOCAL_ADDR)]
        local: String,

        #[arg(long)]
        label: Option<String>,
    },

    /// Remove the instance bound to a local address.
    Delete {
        #[arg(long)]
        local: String,
    },
}

impl Cli {
    pub fn config_dir(&self) -> Result<PathBuf, CliError> {
        match self.config_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(ClientConfig::default_dir()?),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf, CliError> {
        match self.log_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(self.config_dir()?.join(LOG_DIR_NAME)),
        }
    }

    pub fn logger_settings(&self) -> LoggerSettings {
        LoggerSettings::from_flags(self.verbose, self.quiet)
    }

    /// Apply command-line and environment overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(ref api) = self.api {
            config.api = api.clone();
        }
        if let Some(ref name) = self.name {
            config.name = name.clone();
        }
    }
}
