//! ProxmoxClient trait for mocking

use crate::error::ProxmoxError;
use crate::models::{ClusterNode, ClusterStatusEntry, NetworkInterface, NodeVersion};
use tracing::warn;

/// Trait for the Proxmox cluster API operations used by discovery
#[async_trait::async_trait]
pub trait ProxmoxClientTrait: Send + Sync {
    /// `/cluster/status`
    async fn cluster_status(&self) -> Result<Vec<ClusterStatusEntry>, ProxmoxError>;

    /// `/nodes/{node}/version`
    async fn node_version(&self, node: &str) -> Result<NodeVersion, ProxmoxError>;

    /// `/nodes/{node}/network`
    async fn get_network_config(&self, node: &str) -> Result<Vec<NetworkInterface>, ProxmoxError>;

    /// Name of the cluster, if the nodes form one
    async fn cluster_name(&self) -> Result<Option<String>, ProxmoxError> {
        Ok(self
            .cluster_status()
            .await?
            .into_iter()
            .find(ClusterStatusEntry::is_cluster)
            .map(|entry| entry.name))
    }

    /// Member nodes sorted by name, with their running version
    ///
    /// A node whose version cannot be read keeps `version: None`.
    async fn list_nodes(&self) -> Result<Vec<ClusterNode>, ProxmoxError> {
        let mut nodes = Vec::new();
        for entry in self.cluster_status().await? {
            if !entry.is_node() {
                continue;
            }
            let version = if entry.online {
                match self.node_version(&entry.name).await {
                    Ok(v) => Some(v.version),
                    Err(e) => {
                        warn!("Could not read Proxmox version of node {}: {}", entry.name, e);
                        None
                    }
                }
            } else {
                None
            };
            nodes.push(ClusterNode {
                name: entry.name,
                ip: entry.ip,
                online: entry.online,
                version,
            });
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }
}
