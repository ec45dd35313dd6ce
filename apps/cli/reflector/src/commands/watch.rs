use crate::error::CliError;

use common::ErrorLocation;
use daemon_client::DaemonClient;
use models::ClientState;

use std::panic::Location;

use log::{info, warn};
use tokio::signal::ctrl_c;
use tokio::time::sleep;

/// Connect, then follow the daemon until Ctrl-C or until the poll loop stops.
///
/// A pending scope triggers a popup request once so the user sees the
/// approval prompt without hunting for the daemon window.
pub async fn watch(client: &DaemonClient) -> Result<(), CliError> {
    client.on_state_change(|state| info!("Scope state: {state}"));
    client.on_instances_change(|instances| {
        info!("Pool changed: {} instance(s)", instances.len());
        for instance in instances {
            info!("  {} -> {}", instance.local, instance.remote);
        }
    });

    let state = client.connect().await?;
    info!("Connected, scope is {state}");

    if state == ClientState::Pending
        && let Err(error) = client.request_popup().await
    {
        warn!("Could not raise the daemon window: {error}");
    }

    let shutdown = ctrl_c();
    tokio::pin!(shutdown);
    let interval = client.poll_settings().interval;

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(error) = signal {
                    warn!("Failed to listen for Ctrl-C: {error}");
                }
                info!("Interrupted, stopping");
                client.stop_polling();
                return Ok(());
            }
            _ = sleep(interval) => {
                if !client.is_polling() {
                    let state = client.state().await;
                    return Err(CliError::Reflector {
                        message: format!("Poll loop stopped with the scope {state}, connect again to resume"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }
}
