//! Proxmox to NetBox discovery
//!
//! Discovers the hardware identity and network interfaces of every Proxmox VE
//! node over SSH and the cluster API, then files them into NetBox:
//! - Site, cluster type, cluster group and cluster shared by all nodes
//! - Manufacturer, platform, role, device type and device per node
//! - Interfaces, bridges, IP addresses and primary MAC addresses
//!
//! Every step is idempotent; re-running against an unchanged cluster writes nothing.

mod config;
mod credentials;
mod discovery;
mod error;
mod pipeline;
mod reconcile_helpers;
mod reconciler;
#[cfg(test)]
mod reconcile_helpers_test;
#[cfg(test)]
mod test_utils;

use anyhow::{bail, Context};
use clap::Parser;
use config::Config;
use credentials::{collect_credentials, TerminalPrompter};
use discovery::records::NodeRecord;
use discovery::NodeDiscovery;
use error::DiscoveryError;
use netbox_client::NetBoxClient;
use pipeline::{SyncPipeline, SyncSettings};
use proxmox_client::{ProxmoxClient, ProxmoxClientTrait, ProxmoxConnection};
use ssh_client::{expand_home, SshExecutor};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "netbox-proxmox-discovery", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,

    /// Sync the node records under `simulate` instead of discovering live nodes
    #[arg(long)]
    simulate: bool,
}

type Discovered = Vec<(String, Result<NodeRecord, DiscoveryError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    info!("Starting Proxmox discovery");

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    let netbox_url = config.netbox_api_config.url();
    info!("Configuration:");
    info!("  NetBox URL: {}", netbox_url);
    info!(
        "  Proxmox API: {}:{}",
        config.proxmox_api_config.api_host, config.proxmox_api_config.api_port
    );

    let netbox = NetBoxClient::new(
        netbox_url.clone(),
        config.netbox_api_config.api_token.clone(),
        config.netbox_api_config.verify_ssl,
    )
    .context("Failed to create NetBox client")?;
    netbox
        .validate_token()
        .await
        .with_context(|| format!("NetBox at {} rejected the API token", netbox_url))?;

    let (cluster_name, discovered) = if args.simulate {
        simulated(&config)?
    } else {
        discover(&config).await?
    };

    let settings = SyncSettings::new(cluster_name, &config.netbox);
    let report = SyncPipeline::new(&netbox, &settings)
        .run(discovered)
        .await
        .context("Cluster-level objects could not be synced")?;
    report.log();

    if report.has_failures() {
        bail!("{} node(s) failed to sync", report.failure_count());
    }
    Ok(())
}

fn simulated(config: &Config) -> anyhow::Result<(String, Discovered)> {
    let simulate = config
        .simulate
        .clone()
        .context("--simulate needs a `simulate` section in the configuration")?;
    info!("Simulating discovery with {} configured nodes", simulate.nodes.len());

    let cluster_name = simulate
        .cluster_name
        .or_else(|| config.proxmox.cluster_name.clone())
        .or_else(|| simulate.nodes.first().map(|node| node.name.clone()))
        .context("No cluster name configured and no simulated nodes")?;
    let discovered = simulate
        .nodes
        .into_iter()
        .map(|node| (node.name.clone(), Ok(node)))
        .collect();
    Ok((cluster_name, discovered))
}

async fn discover(config: &Config) -> anyhow::Result<(String, Discovered)> {
    let api = &config.proxmox_api_config;
    let proxmox = ProxmoxClient::new(&ProxmoxConnection {
        host: api.api_host.clone(),
        port: api.api_port,
        user: api.api_user.clone(),
        token_id: api.api_token_id.clone(),
        token_secret: api.api_token_secret.clone(),
        verify_ssl: api.verify_ssl,
    })
    .context("Failed to create Proxmox client")?;

    let nodes = proxmox
        .list_nodes()
        .await
        .with_context(|| format!("Failed to list nodes of {}", api.api_host))?;
    if nodes.is_empty() {
        bail!("Proxmox API at {} reported no nodes", api.api_host);
    }

    let cluster_name = match proxmox.cluster_name().await {
        Ok(Some(name)) => Some(name),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read cluster name: {}", e);
            None
        }
    }
    .or_else(|| config.proxmox.cluster_name.clone())
    .or_else(|| nodes.first().map(|node| node.name.clone()))
    .context("Could not determine a cluster name")?;
    info!("Cluster {} has {} nodes", cluster_name, nodes.len());

    let logins = collect_credentials(&mut TerminalPrompter, &nodes).context("Failed to collect node credentials")?;

    let known_hosts = expand_home(&config.proxmox.ssh_known_hosts_file)
        .context("Failed to resolve the known hosts file")?;
    let executor = SshExecutor::new(known_hosts);
    let discovery = NodeDiscovery::new(
        &executor,
        &proxmox,
        &config.proxmox.node_commands,
        config.proxmox.ssh_port,
    );
    Ok((cluster_name, discovery.discover_all(&nodes, &logins).await))
}
