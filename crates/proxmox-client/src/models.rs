//! Proxmox API models
//!
//! Only the fields the inventory sync reads are modelled; everything else in
//! the API responses is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Every Proxmox API response wraps its payload in `{"data": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// One entry of `/cluster/status`: either the cluster itself or a member node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatusEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub online: bool,
    #[serde(default)]
    pub nodeid: Option<u64>,
}

impl ClusterStatusEntry {
    pub fn is_cluster(&self) -> bool {
        self.kind == "cluster"
    }

    pub fn is_node(&self) -> bool {
        self.kind == "node"
    }
}

/// A cluster member node with the details discovery needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub version: Option<String>,
}

/// `/nodes/{node}/version`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVersion {
    pub version: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub repoid: Option<String>,
}

/// One interface of `/nodes/{node}/network`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub iface: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub active: bool,
    #[serde(default)]
    pub bridge_ports: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub cidr6: Option<String>,
}

/// Proxmox reports booleans as `0`/`1`; accept real booleans too
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Text(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        None => false,
    })
}
