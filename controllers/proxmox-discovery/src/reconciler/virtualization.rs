//! Virtualization resource kinds (cluster types, groups, clusters, VMs)

use super::mac_address::{bind_mac_address, InterfaceOwner};
use super::{reconcile, Lookup, Reconciled, ResourceKind, ResourcePayload};
use crate::error::ReconcileError;
use crate::reconcile_helpers::make_slug;
use netbox_client::{Endpoint, NetBoxClientTrait};
use serde::Serialize;

pub const CLUSTER_TYPE: ResourceKind = ResourceKind {
    name: "cluster type",
    endpoint: Endpoint::ClusterTypes,
    required: &["name", "slug"],
    lookup: Lookup::Field("name"),
};

pub const CLUSTER_GROUP: ResourceKind = ResourceKind {
    name: "cluster group",
    endpoint: Endpoint::ClusterGroups,
    required: &["name", "slug"],
    lookup: Lookup::Field("name"),
};

pub const CLUSTER: ResourceKind = ResourceKind {
    name: "cluster",
    endpoint: Endpoint::Clusters,
    required: &["name", "type", "status"],
    lookup: Lookup::Field("name"),
};

pub const VIRTUAL_MACHINE: ResourceKind = ResourceKind {
    name: "virtual machine",
    endpoint: Endpoint::VirtualMachines,
    required: &["name", "cluster", "status"],
    lookup: Lookup::Field("name"),
};

pub const VM_INTERFACE: ResourceKind = ResourceKind {
    name: "vm interface",
    endpoint: Endpoint::VmInterfaces,
    required: &["name", "virtual_machine"],
    lookup: Lookup::Fields(&[("virtual_machine_id", "virtual_machine"), ("name", "name")]),
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResourcePayload for ClusterPayload {
    fn kind(&self) -> ResourceKind {
        CLUSTER
    }
}

/// Cluster type or group: name and slug
#[derive(Debug, Clone, Serialize)]
pub struct ClusterClassPayload {
    #[serde(skip)]
    kind: ResourceKind,
    pub name: String,
    pub slug: String,
}

impl ClusterClassPayload {
    pub fn cluster_type(name: &str) -> Self {
        Self {
            kind: CLUSTER_TYPE,
            name: name.to_string(),
            slug: make_slug(name),
        }
    }

    pub fn cluster_group(name: &str) -> Self {
        Self {
            kind: CLUSTER_GROUP,
            name: name.to_string(),
            slug: make_slug(name),
        }
    }
}

impl ResourcePayload for ClusterClassPayload {
    fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualMachinePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<f64>,
    /// MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// GB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
}

impl ResourcePayload for VirtualMachinePayload {
    fn kind(&self) -> ResourceKind {
        VIRTUAL_MACHINE
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VmInterfacePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_machine: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    /// Bound as a separate MAC address object, never sent with the interface
    #[serde(skip)]
    pub mac_address: Option<String>,
}

impl ResourcePayload for VmInterfacePayload {
    fn kind(&self) -> ResourceKind {
        VM_INTERFACE
    }
}

/// Reconcile a VM interface, then bind its MAC address if one is given
pub async fn sync_vm_interface(
    client: &dyn NetBoxClientTrait,
    interface: &VmInterfacePayload,
) -> Result<Reconciled, ReconcileError> {
    let payload = interface.to_payload()?;
    let reconciled = reconcile(client, &VM_INTERFACE, &payload).await?;

    let (Some(mac), Some(vm), Some(name)) = (
        interface.mac_address.as_deref().filter(|m| !m.trim().is_empty()),
        interface.virtual_machine,
        interface.name.as_deref(),
    ) else {
        return Ok(reconciled);
    };
    let enabled = interface.enabled.unwrap_or(true);
    bind_mac_address(client, InterfaceOwner::VirtualMachine, vm, name, mac, enabled).await?;
    Ok(reconciled)
}
