//! YAML configuration
//!
//! ```yaml
//! proxmox_api_config:
//!   api_host: pve1.example.com
//!   api_user: netbox@pve
//!   api_token_id: discovery
//!   api_token_secret: 00000000-0000-0000-0000-000000000000
//! netbox_api_config:
//!   api_host: netbox.example.com
//!   api_token: 0123456789abcdef
//! proxmox:
//!   node_commands:
//!     dmidecode_command: /usr/sbin/dmidecode
//! netbox:
//!   site: DC1
//! ```

use crate::discovery::records::NodeRecord;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub proxmox_api_config: ProxmoxApiConfig,
    pub netbox_api_config: NetBoxApiConfig,
    #[serde(default)]
    pub proxmox: ProxmoxSettings,
    #[serde(default)]
    pub netbox: NetBoxSettings,
    /// Node records used instead of live discovery with `--simulate`
    #[serde(default)]
    pub simulate: Option<SimulatedCluster>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Proxmox VE API token access
#[derive(Clone, Deserialize)]
pub struct ProxmoxApiConfig {
    pub api_host: String,
    #[serde(default = "default_proxmox_port")]
    pub api_port: u16,
    pub api_user: String,
    pub api_token_id: String,
    pub api_token_secret: String,
    #[serde(default)]
    pub verify_ssl: bool,
}

impl fmt::Debug for ProxmoxApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxApiConfig")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("api_user", &self.api_user)
            .field("api_token_id", &self.api_token_id)
            .field("api_token_secret", &"***")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// NetBox API access
#[derive(Clone, Deserialize)]
pub struct NetBoxApiConfig {
    #[serde(default = "default_proto")]
    pub api_proto: String,
    pub api_host: String,
    #[serde(default = "default_netbox_port")]
    pub api_port: u16,
    pub api_token: String,
    #[serde(default)]
    pub verify_ssl: bool,
}

impl NetBoxApiConfig {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.api_proto, self.api_host, self.api_port)
    }
}

impl fmt::Debug for NetBoxApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetBoxApiConfig")
            .field("url", &self.url())
            .field("api_token", &"***")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// SSH access to the nodes
#[derive(Debug, Clone, Deserialize)]
pub struct ProxmoxSettings {
    #[serde(default = "default_known_hosts")]
    pub ssh_known_hosts_file: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    /// Used when the API reports no cluster
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub node_commands: NodeCommands,
}

impl Default for ProxmoxSettings {
    fn default() -> Self {
        Self {
            ssh_known_hosts_file: default_known_hosts(),
            ssh_port: default_ssh_port(),
            cluster_name: None,
            node_commands: NodeCommands::default(),
        }
    }
}

/// Diagnostic commands run on each node
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeCommands {
    #[serde(default = "default_dmidecode")]
    pub dmidecode_command: String,
    #[serde(default = "default_ethtool")]
    pub ethtool_command: String,
}

impl Default for NodeCommands {
    fn default() -> Self {
        Self {
            dmidecode_command: default_dmidecode(),
            ethtool_command: default_ethtool(),
        }
    }
}

/// Names of the NetBox objects the nodes are filed under
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetBoxSettings {
    #[serde(default)]
    pub site: Option<String>,
    /// Cluster type name
    #[serde(default)]
    pub cluster_role: Option<String>,
    #[serde(default)]
    pub cluster_group: Option<String>,
    #[serde(default)]
    pub device_role: Option<String>,
}

/// Offline input for `--simulate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulatedCluster {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

fn default_proxmox_port() -> u16 {
    8006
}

fn default_proto() -> String {
    "https".to_string()
}

fn default_netbox_port() -> u16 {
    443
}

fn default_known_hosts() -> String {
    "~/.ssh/known_hosts".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_dmidecode() -> String {
    "/usr/sbin/dmidecode".to_string()
}

fn default_ethtool() -> String {
    "/usr/sbin/ethtool".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
proxmox_api_config:
  api_host: pve1.example.com
  api_user: netbox@pve
  api_token_id: discovery
  api_token_secret: s3cr3t
netbox_api_config:
  api_host: netbox.example.com
  api_token: t0k3n
"#;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.proxmox_api_config.api_port, 8006);
        assert!(!config.proxmox_api_config.verify_ssl);
        assert_eq!(config.netbox_api_config.url(), "https://netbox.example.com:443");
        assert_eq!(config.proxmox.ssh_port, 22);
        assert_eq!(config.proxmox.ssh_known_hosts_file, "~/.ssh/known_hosts");
        assert_eq!(config.proxmox.node_commands, NodeCommands::default());
        assert!(config.netbox.site.is_none());
        assert!(config.simulate.is_none());
    }

    #[test]
    fn test_overrides_and_simulated_nodes() {
        let yaml = format!(
            "{}{}",
            MINIMAL,
            r#"
proxmox:
  cluster_name: lab
  node_commands:
    ethtool_command: /sbin/ethtool
netbox:
  site: DC1
  device_role: Hypervisor
simulate:
  nodes:
    - name: pve1
      version: 8.2.4
      system:
        manufacturer: Protectli
        model: VP2420
"#
        );
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.proxmox.cluster_name.as_deref(), Some("lab"));
        assert_eq!(config.proxmox.node_commands.ethtool_command, "/sbin/ethtool");
        assert_eq!(config.proxmox.node_commands.dmidecode_command, "/usr/sbin/dmidecode");
        assert_eq!(config.netbox.device_role.as_deref(), Some("Hypervisor"));
        let simulate = config.simulate.unwrap();
        assert_eq!(simulate.nodes.len(), 1);
        assert_eq!(simulate.nodes[0].system.model.as_deref(), Some("VP2420"));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cr3t"));
        assert!(!rendered.contains("t0k3n"));
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let result = Config::from_yaml("netbox_api_config: {api_host: x, api_token: y}\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
