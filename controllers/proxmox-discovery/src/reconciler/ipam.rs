//! IPAM resource kinds

use super::{Lookup, ResourceKind, ResourcePayload};
use super::mac_address::InterfaceOwner;
use netbox_client::Endpoint;
use serde::Serialize;

pub const IP_ADDRESS: ResourceKind = ResourceKind {
    name: "ip address",
    endpoint: Endpoint::IpAddresses,
    required: &["address", "status"],
    lookup: Lookup::Field("address"),
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct IpAddressPayload {
    /// CIDR notation, `10.0.0.11/24`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IpAddressPayload {
    /// An active address assigned to an interface
    pub fn assigned(address: &str, owner: InterfaceOwner, interface_id: u64) -> Self {
        Self {
            address: Some(address.to_string()),
            status: Some("active".to_string()),
            assigned_object_type: Some(owner.object_type().to_string()),
            assigned_object_id: Some(interface_id),
            ..Default::default()
        }
    }
}

impl ResourcePayload for IpAddressPayload {
    fn kind(&self) -> ResourceKind {
        IP_ADDRESS
    }
}
