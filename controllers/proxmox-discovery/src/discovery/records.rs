//! Discovered inventory records handed from discovery to the sync pipeline

use crate::credentials::LoginInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical interface type label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterfaceType {
    /// Physical media/speed label such as `1gbase-t`
    Link(String),
    Virtual,
    Bridge,
    Other,
}

impl InterfaceType {
    pub fn as_str(&self) -> &str {
        match self {
            InterfaceType::Link(label) => label,
            InterfaceType::Virtual => "virtual",
            InterfaceType::Bridge => "bridge",
            InterfaceType::Other => "other",
        }
    }
}

impl From<String> for InterfaceType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "virtual" => InterfaceType::Virtual,
            "bridge" => InterfaceType::Bridge,
            "other" | "" => InterfaceType::Other,
            _ => InterfaceType::Link(label),
        }
    }
}

impl From<InterfaceType> for String {
    fn from(kind: InterfaceType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One network interface of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mac: String,
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6address: Option<String>,
    /// Member interface of a bridge; marks this interface as a bridge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_ports: Option<String>,
}

impl InterfaceRecord {
    pub fn is_bridge(&self) -> bool {
        self.bridge_ports.is_some()
    }
}

/// Hardware identity and interfaces of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    /// Keyed by interface name; iteration is lexicographic
    #[serde(default)]
    pub network_interfaces: BTreeMap<String, InterfaceRecord>,
}

/// Everything discovered about one hypervisor node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    /// Running Proxmox VE version, reconciled as the platform
    #[serde(default)]
    pub version: Option<String>,
    #[serde(skip)]
    pub login_info: Option<LoginInfo>,
    #[serde(default)]
    pub system: SystemRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_type_labels() {
        assert_eq!(InterfaceType::from("1gbase-t".to_string()), InterfaceType::Link("1gbase-t".to_string()));
        assert_eq!(InterfaceType::from("bridge".to_string()), InterfaceType::Bridge);
        assert_eq!(InterfaceType::from(String::new()), InterfaceType::Other);
        assert_eq!(String::from(InterfaceType::Virtual), "virtual");
    }

    #[test]
    fn test_node_record_from_yaml() {
        let yaml = r#"
name: pve1
ip: 10.0.0.11
version: 8.2.4
system:
  manufacturer: Protectli
  model: VP2420
  network_interfaces:
    enp1s0: {enabled: true, mac: "00:e0:67:2a:11:01", type: 1gbase-t}
    vmbr0: {enabled: true, mac: "00:e0:67:2a:11:01", type: bridge, bridge_ports: enp1s0, ipv4address: 10.0.0.11/24}
"#;
        let node: NodeRecord = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<_> = node.system.network_interfaces.keys().cloned().collect();
        assert_eq!(names, vec!["enp1s0", "vmbr0"]);
        assert!(node.system.network_interfaces["vmbr0"].is_bridge());
        assert_eq!(node.system.serial, None);
        assert!(node.login_info.is_none());
    }
}
