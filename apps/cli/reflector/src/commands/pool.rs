use crate::commands::ensure_usable;
use crate::error::CliError;

use daemon_client::DaemonClient;
use models::Instance;

use log::info;

const UNKNOWN_LATENCY: &str = "-";
const UNUSABLE_LATENCY: &str = "down";

fn latency_cell(instance: &Instance) -> String {
    match instance.latency {
        _ if !instance.is_usable() => UNUSABLE_LATENCY.to_string(),
        Some(latency) => format!("{latency}ms"),
        None => UNKNOWN_LATENCY.to_string(),
    }
}

/// Render the pool as a fixed-width table, header first.
pub fn format_pool(instances: &[Instance]) -> String {
    let mut table = format!("{:<22} {:>8}  {:<16} {}\n", "LOCAL", "LATENCY", "LABEL", "REMOTE");
    for instance in instances {
        table.push_str(&format!(
            "{:<22} {:>8}  {:<16} {}\n",
            instance.local,
            latency_cell(instance),
            instance.label.as_deref().unwrap_or(""),
            instance.remote
        ));
    }
    table
}

pub async fn list(client: &DaemonClient) -> Result<(), CliError> {
    ensure_usable(client).await?;
    let instances = client.sync().await?;

    print!("{}", format_pool(&instances));
    info!("{} instance(s) in the pool", instances.len());
    Ok(())
}

pub async fn add(
    client: &DaemonClient,
    remote: &str,
    local: &str,
    label: Option<&str>,
) -> Result<(), CliError> {
    ensure_usable(client).await?;
    // Fill the cache so an existing instance for this remote is reused
    client.sync().await?;

    let mut instance = Instance::new(remote, local);
    if let Some(label) = label {
        instance = instance.with_label(label);
    }

    let created = client.add(instance).await?;
    println!("{} -> {}", created.local, created.remote);
    Ok(())
}

pub async fn delete(client: &DaemonClient, local: &str) -> Result<(), CliError> {
    ensure_usable(client).await?;
    client.delete(local).await?;

    println!("Deleted {local}");
    Ok(())
}
