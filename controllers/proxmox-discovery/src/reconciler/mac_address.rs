//! MAC address objects and primary MAC binding
//!
//! NetBox keeps MAC addresses as objects of their own. Binding one to an
//! interface takes three steps: find the interface, reconcile the MAC object
//! assigned to it, then point the interface's `primary_mac_address` at it.

use super::dcim::INTERFACE;
use super::virtualization::VM_INTERFACE;
use super::{converge, reconcile, Lookup, Payload, Reconciled, ResourceKind, ResourcePayload};
use crate::error::ReconcileError;
use netbox_client::{Endpoint, NetBoxClientTrait};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const MAC_ADDRESS: ResourceKind = ResourceKind {
    name: "mac address",
    endpoint: Endpoint::MacAddresses,
    required: &["mac_address", "assigned_object_type", "assigned_object_id"],
    lookup: Lookup::Fields(&[
        ("mac_address", "mac_address"),
        ("assigned_object_type", "assigned_object_type"),
        ("assigned_object_id", "assigned_object_id"),
    ]),
};

/// What kind of object owns the interface a MAC is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceOwner {
    Device,
    VirtualMachine,
}

impl InterfaceOwner {
    pub fn interface_kind(self) -> ResourceKind {
        match self {
            InterfaceOwner::Device => INTERFACE,
            InterfaceOwner::VirtualMachine => VM_INTERFACE,
        }
    }

    /// Content type NetBox uses for `assigned_object_type`
    pub fn object_type(self) -> &'static str {
        match self {
            InterfaceOwner::Device => "dcim.interface",
            InterfaceOwner::VirtualMachine => "virtualization.vminterface",
        }
    }

    /// Query parameter selecting the interface's parent
    pub fn parent_key(self) -> &'static str {
        match self {
            InterfaceOwner::Device => "device_id",
            InterfaceOwner::VirtualMachine => "virtual_machine_id",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MacAddressPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MacAddressPayload {
    /// MAC assigned to an interface; stored upper case as NetBox returns it
    pub fn assigned(owner: InterfaceOwner, interface_id: u64, mac: &str) -> Self {
        Self {
            mac_address: Some(mac.trim().to_uppercase()),
            assigned_object_type: Some(owner.object_type().to_string()),
            assigned_object_id: Some(interface_id),
            description: None,
        }
    }
}

impl ResourcePayload for MacAddressPayload {
    fn kind(&self) -> ResourceKind {
        MAC_ADDRESS
    }
}

/// Bind `mac` as the primary MAC of an existing interface and set its enabled flag
///
/// Returns the converged interface.
pub async fn bind_mac_address(
    client: &dyn NetBoxClientTrait,
    owner: InterfaceOwner,
    parent_id: u64,
    interface_name: &str,
    mac: &str,
    enabled: bool,
) -> Result<Reconciled, ReconcileError> {
    let kind = owner.interface_kind();
    let parent = parent_id.to_string();
    let filters = [(owner.parent_key(), parent.as_str()), ("name", interface_name)];

    let interface = client
        .get(kind.endpoint, &filters)
        .await
        .map_err(|source| ReconcileError::Reconciliation {
            kind: kind.name,
            operation: "locate",
            source,
        })?
        .ok_or_else(|| ReconcileError::NotFound {
            kind: kind.name,
            lookup: format!("{}={} name={}", owner.parent_key(), parent_id, interface_name),
        })?;

    let payload = MacAddressPayload::assigned(owner, interface.id, mac).to_payload()?;
    let mac_object = reconcile(client, &MAC_ADDRESS, &payload).await?;
    debug!(
        "MAC {} (ID: {}) assigned to {} {}",
        mac,
        mac_object.id(),
        kind.name,
        interface_name
    );

    let mut desired = Payload::new();
    desired.insert("enabled".to_string(), Value::Bool(enabled));
    desired.insert("primary_mac_address".to_string(), Value::from(mac_object.id()));
    converge(client, &kind, interface, &desired).await
}
