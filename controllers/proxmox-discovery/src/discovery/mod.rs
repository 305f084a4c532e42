//! Node discovery
//!
//! For every online cluster node: read the hardware identity over SSH, take the
//! interface list from the cluster API, read each interface's MAC address and
//! classify it. Failures are per node; the remaining nodes are still processed.

pub mod classifier;
pub mod parser;
pub mod records;
#[cfg(test)]
mod discovery_test;

use crate::config::NodeCommands;
use crate::credentials::LoginInfo;
use crate::error::{ConfigurationError, DiscoveryError};
use classifier::classify_link;
use parser::{parse_key_values, parse_key_values_lenient};
use proxmox_client::{ClusterNode, NetworkInterface, ProxmoxClientTrait};
use records::{InterfaceRecord, InterfaceType, NodeRecord, SystemRecord};
use ssh_client::{HostCredentials, Privilege, RemoteExecutor};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Appliance vendors that ship without a hardware serial (lower case)
const SERIAL_FROM_MAC_VENDORS: &[&str] = &["protectli"];

/// Serial numbers that firmware reports when none was programmed (lower case)
const PLACEHOLDER_SERIALS: &[&str] = &[
    "",
    "default string",
    "to be filled by o.e.m.",
    "not specified",
    "system serial number",
];

/// Build SSH credentials for a node from the operator's login info
///
/// Non-root logins must have sudo enabled.
pub fn host_credentials(
    node: &str,
    fallback_ip: Option<&str>,
    login: &LoginInfo,
    port: u16,
) -> Result<HostCredentials, ConfigurationError> {
    let username = login
        .login
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ConfigurationError::MissingLoginField {
            node: node.to_string(),
            field: "login",
        })?;

    let password = if login.use_pass {
        let pass = login
            .pass
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigurationError::MissingLoginField {
                node: node.to_string(),
                field: "pass",
            })?;
        Some(pass)
    } else {
        None
    };

    let privilege = if username == "root" {
        Privilege::Direct
    } else if login.use_sudo == Some(true) {
        Privilege::Sudo {
            password: login.sudo_pass.clone().filter(|p| !p.is_empty()),
        }
    } else {
        return Err(ConfigurationError::SudoRequired {
            node: node.to_string(),
            login: username.to_string(),
        });
    };

    let host = login
        .ip
        .as_deref()
        .or(fallback_ip)
        .filter(|ip| !ip.is_empty())
        .ok_or_else(|| ConfigurationError::MissingLoginField {
            node: node.to_string(),
            field: "ip",
        })?;

    Ok(HostCredentials {
        host: host.to_string(),
        port,
        username: username.to_string(),
        password,
        privilege,
    })
}

/// Whether a reported serial is a firmware placeholder
pub fn is_placeholder_serial(serial: &str) -> bool {
    PLACEHOLDER_SERIALS.contains(&serial.trim().to_lowercase().as_str())
}

/// Synthesize a serial from the first interface MAC for appliance vendors
///
/// Applies only when no hardware serial is known. `AA:BB:..` becomes `aa-bb-..`.
pub fn apply_serial_fallback(system: &mut SystemRecord) {
    if system.serial.is_some() {
        return;
    }
    let Some(manufacturer) = system.manufacturer.as_deref() else {
        return;
    };
    if !SERIAL_FROM_MAC_VENDORS.contains(&manufacturer.trim().to_lowercase().as_str()) {
        return;
    }
    let Some(mac) = system
        .network_interfaces
        .values()
        .map(|iface| iface.mac.trim())
        .find(|mac| !mac.is_empty())
    else {
        warn!("No interface MAC available to derive a serial for {}", manufacturer);
        return;
    };
    let serial = mac.to_lowercase().replace(':', "-");
    debug!("Using {} as serial for {} appliance", serial, manufacturer);
    system.serial = Some(serial);
}

/// Discovers nodes through SSH and the cluster API
pub struct NodeDiscovery<'a> {
    executor: &'a dyn RemoteExecutor,
    cluster: &'a dyn ProxmoxClientTrait,
    commands: &'a NodeCommands,
    ssh_port: u16,
}

impl<'a> NodeDiscovery<'a> {
    pub fn new(
        executor: &'a dyn RemoteExecutor,
        cluster: &'a dyn ProxmoxClientTrait,
        commands: &'a NodeCommands,
        ssh_port: u16,
    ) -> Self {
        Self {
            executor,
            cluster,
            commands,
            ssh_port,
        }
    }

    /// Discover every online node that has credentials
    ///
    /// Results come back in node order; a failed node does not stop the others.
    pub async fn discover_all(
        &self,
        nodes: &[ClusterNode],
        logins: &BTreeMap<String, LoginInfo>,
    ) -> Vec<(String, Result<NodeRecord, DiscoveryError>)> {
        let mut results = Vec::new();
        for node in nodes {
            if !node.online {
                debug!("Skipping offline node {}", node.name);
                continue;
            }
            let result = match logins.get(&node.name) {
                Some(login) => self.discover(node, login).await,
                None => Err(ConfigurationError::MissingLoginField {
                    node: node.name.clone(),
                    field: "login",
                }
                .into()),
            };
            if let Err(e) = &result {
                warn!("Discovery of node {} failed: {}", node.name, e);
            }
            results.push((node.name.clone(), result));
        }
        results
    }

    /// Discover a single node
    pub async fn discover(&self, node: &ClusterNode, login: &LoginInfo) -> Result<NodeRecord, DiscoveryError> {
        let credentials = host_credentials(&node.name, node.ip.as_deref(), login, self.ssh_port)?;
        info!("Discovering node {} at {}", node.name, credentials.host);

        let mut system = self.system_identity(&node.name, &credentials).await?;

        let config = self
            .cluster
            .get_network_config(&node.name)
            .await
            .map_err(|source| DiscoveryError::ClusterApi {
                node: node.name.clone(),
                source,
            })?;
        if config.is_empty() {
            return Err(DiscoveryError::Empty {
                node: node.name.clone(),
                what: "network configuration",
            });
        }

        let mut ordered: Vec<&NetworkInterface> = config.iter().collect();
        ordered.sort_by(|a, b| a.iface.cmp(&b.iface));
        for iface in ordered {
            let record = self.interface(&node.name, &credentials, iface).await?;
            debug!("Node {} interface {}: {}", node.name, iface.iface, record.interface_type);
            system.network_interfaces.insert(iface.iface.clone(), record);
        }

        apply_serial_fallback(&mut system);

        info!(
            "Discovered node {}: {} interfaces",
            node.name,
            system.network_interfaces.len()
        );
        Ok(NodeRecord {
            name: node.name.clone(),
            ip: Some(credentials.host.clone()),
            version: node.version.clone(),
            login_info: Some(login.clone()),
            system,
        })
    }

    async fn system_identity(
        &self,
        node: &str,
        credentials: &HostCredentials,
    ) -> Result<SystemRecord, DiscoveryError> {
        let command = format!("{} -t system", self.commands.dmidecode_command);
        let output = self.run(node, credentials, &command).await?;
        let block = parse_key_values_lenient(&output);
        if block.is_empty() {
            return Err(DiscoveryError::Empty {
                node: node.to_string(),
                what: "system identity",
            });
        }

        let text = |key: &str| block.text(key).map(str::to_string).filter(|v| !v.is_empty());
        Ok(SystemRecord {
            manufacturer: text("manufacturer"),
            model: text("product_name"),
            serial: block
                .text("serial_number")
                .filter(|s| !is_placeholder_serial(s))
                .map(str::to_string),
            network_interfaces: BTreeMap::new(),
        })
    }

    async fn interface(
        &self,
        node: &str,
        credentials: &HostCredentials,
        iface: &NetworkInterface,
    ) -> Result<InterfaceRecord, DiscoveryError> {
        let mac_command = format!("/usr/bin/cat /sys/class/net/{}/address", iface.iface);
        let mac = self.run(node, credentials, &mac_command).await?.trim().to_string();

        let bridge_ports = iface
            .bridge_ports
            .as_deref()
            .and_then(|ports| ports.split_whitespace().next())
            .filter(|port| *port != "none")
            .map(str::to_string);

        let kind = iface.kind.as_deref().unwrap_or_default();
        let (interface_type, duplex) =
            if bridge_ports.is_some() || iface.iface.starts_with("vmbr") || matches!(kind, "bridge" | "OVSBridge") {
                (InterfaceType::Bridge, None)
            } else if kind == "vlan" {
                (InterfaceType::Virtual, None)
            } else if iface.active {
                let command = format!("{} {}", self.commands.ethtool_command, iface.iface);
                let output = self.run(node, credentials, &command).await?;
                let block = parse_key_values(&output).map_err(|source| DiscoveryError::Parse {
                    node: node.to_string(),
                    command: command.clone(),
                    source,
                })?;
                let link = classify_link(&block);
                (link.interface_type, link.duplex)
            } else {
                (InterfaceType::Other, None)
            };

        Ok(InterfaceRecord {
            enabled: iface.active,
            mac,
            interface_type,
            duplex,
            ipv4address: iface.cidr.clone(),
            ipv6address: iface.cidr6.clone(),
            bridge_ports,
        })
    }

    /// Run a required command; anything on stderr is fatal for the node
    async fn run(&self, node: &str, credentials: &HostCredentials, command: &str) -> Result<String, DiscoveryError> {
        let output = self
            .executor
            .execute(credentials, command)
            .await
            .map_err(|source| DiscoveryError::Transport {
                node: node.to_string(),
                command: command.to_string(),
                source,
            })?;
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            return Err(DiscoveryError::Command {
                node: node.to_string(),
                command: command.to_string(),
                stderr: stderr.to_string(),
            });
        }
        Ok(output.stdout)
    }
}
