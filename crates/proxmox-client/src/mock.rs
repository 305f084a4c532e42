//! Mock ProxmoxClient for unit testing
//!
//! Serves canned cluster status, node versions and network configurations.

use crate::error::ProxmoxError;
use crate::models::{ClusterStatusEntry, NetworkInterface, NodeVersion};
use crate::proxmox_trait::ProxmoxClientTrait;
use std::collections::HashMap;

/// Mock ProxmoxClient for testing
#[derive(Debug, Clone, Default)]
pub struct MockProxmoxClient {
    status: Vec<ClusterStatusEntry>,
    versions: HashMap<String, String>,
    networks: HashMap<String, Vec<NetworkInterface>>,
}

impl MockProxmoxClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a cluster entry with the given name
    pub fn with_cluster(mut self, name: &str) -> Self {
        self.status.push(ClusterStatusEntry {
            kind: "cluster".to_string(),
            name: name.to_string(),
            ip: None,
            online: true,
            nodeid: None,
        });
        self
    }

    /// Add a member node
    pub fn with_node(mut self, name: &str, ip: &str, online: bool, version: &str) -> Self {
        self.status.push(ClusterStatusEntry {
            kind: "node".to_string(),
            name: name.to_string(),
            ip: Some(ip.to_string()),
            online,
            nodeid: Some(self.status.len() as u64 + 1),
        });
        self.versions.insert(name.to_string(), version.to_string());
        self
    }

    /// Set the network configuration of a node
    pub fn with_network(mut self, node: &str, interfaces: Vec<NetworkInterface>) -> Self {
        self.networks.insert(node.to_string(), interfaces);
        self
    }
}

#[async_trait::async_trait]
impl ProxmoxClientTrait for MockProxmoxClient {
    async fn cluster_status(&self) -> Result<Vec<ClusterStatusEntry>, ProxmoxError> {
        Ok(self.status.clone())
    }

    async fn node_version(&self, node: &str) -> Result<NodeVersion, ProxmoxError> {
        self.versions
            .get(node)
            .map(|version| NodeVersion {
                version: version.clone(),
                release: None,
                repoid: None,
            })
            .ok_or_else(|| ProxmoxError::NotFound(format!("/nodes/{}/version", node)))
    }

    async fn get_network_config(&self, node: &str) -> Result<Vec<NetworkInterface>, ProxmoxError> {
        let mut interfaces = self
            .networks
            .get(node)
            .cloned()
            .ok_or_else(|| ProxmoxError::NotFound(format!("/nodes/{}/network", node)))?;
        interfaces.sort_by(|a, b| a.iface.cmp(&b.iface));
        Ok(interfaces)
    }
}
