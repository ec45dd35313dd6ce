//! Command handlers. Each one owns a single `DaemonClient` for its lifetime.

pub mod init;
pub mod pool;
pub mod watch;

use crate::cli::{Cli, Command};
use crate::error::CliError;

use daemon_client::DaemonClient;
use daemon_client::config::ClientConfig;

use std::path::Path;

use log::{debug, info};

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config_dir = cli.config_dir()?;
    debug!("Using config directory {}", config_dir.display());

    match cli.command {
        Command::Init { force } => init::init(&cli, &config_dir, force),
        Command::Watch => watch::watch(&client_from(&cli, &config_dir)?).await,
        Command::List => pool::list(&client_from(&cli, &config_dir)?).await,
        Command::Add {
            ref remote,
            ref local,
            ref label,
        } => {
            let client = client_from(&cli, &config_dir)?;
            pool::add(&client, remote, local, label.as_deref()).await
        }
        Command::Delete { ref local } => {
            pool::delete(&client_from(&cli, &config_dir)?, local).await
        }
    }
}

/// Build a client from the config file plus command-line overrides.
pub fn client_from(cli: &Cli, config_dir: &Path) -> Result<DaemonClient, CliError> {
    let mut config = ClientConfig::load(config_dir)?;
    cli.apply_overrides(&mut config);

    let options = config.to_options()?;
    info!("Daemon API: {} as {}", options.api(), options.name());

    Ok(DaemonClient::with_poll_settings(
        options,
        config.poll_settings(),
    )?)
}

/// Gate on the daemon version and require an approved scope.
///
/// One-shot commands use this instead of `connect`: they never request a new
/// scope and never start the poll loop. A pending or missing scope surfaces as
/// the probe's own error.
pub async fn ensure_usable(client: &DaemonClient) -> Result<(), CliError> {
    let version = client.check_version().await?;
    debug!("Daemon version {version}");

    let state = client.check().await?;
    debug!("Scope is {state}");
    Ok(())
}
