use crate::cli::Cli;
use crate::error::CliError;

use common::ErrorLocation;
use daemon_client::config::ClientConfig;

use std::panic::Location;
use std::path::Path;

use log::info;

/// Write a default `client.json`, with command-line overrides applied.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init(cli: &Cli, config_dir: &Path, force: bool) -> Result<(), CliError> {
    let config_path = ClientConfig::path(config_dir);
    if config_path.exists() && !force {
        return Err(CliError::Config {
            message: format!(
                "{} already exists, pass --force to overwrite it",
                config_path.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut config = ClientConfig::default();
    cli.apply_overrides(&mut config);
    config.to_options()?;
    config.save(config_dir)?;

    info!("Wrote {}", config_path.display());
    Ok(())
}
