//! DCIM resource kinds
//!
//! Handles: Site, Manufacturer, Platform, DeviceRole, DeviceType,
//! InterfaceTemplate, Device, Interface

use super::{Lookup, ResourceKind, ResourcePayload};
use crate::reconcile_helpers::make_slug;
use netbox_client::Endpoint;
use serde::Serialize;

pub const SITE: ResourceKind = ResourceKind {
    name: "site",
    endpoint: Endpoint::Sites,
    required: &["name", "slug", "status"],
    lookup: Lookup::Field("name"),
};

pub const MANUFACTURER: ResourceKind = ResourceKind {
    name: "manufacturer",
    endpoint: Endpoint::Manufacturers,
    required: &["name", "slug"],
    lookup: Lookup::Field("name"),
};

pub const PLATFORM: ResourceKind = ResourceKind {
    name: "platform",
    endpoint: Endpoint::Platforms,
    required: &["name", "slug"],
    lookup: Lookup::Field("name"),
};

pub const DEVICE_ROLE: ResourceKind = ResourceKind {
    name: "device role",
    endpoint: Endpoint::DeviceRoles,
    required: &["name", "slug", "vm_role"],
    lookup: Lookup::Field("name"),
};

pub const DEVICE_TYPE: ResourceKind = ResourceKind {
    name: "device type",
    endpoint: Endpoint::DeviceTypes,
    required: &["manufacturer", "model", "slug", "u_height"],
    lookup: Lookup::Field("model"),
};

pub const INTERFACE_TEMPLATE: ResourceKind = ResourceKind {
    name: "interface template",
    endpoint: Endpoint::InterfaceTemplates,
    required: &["device_type", "name", "type"],
    lookup: Lookup::Fields(&[("device_type_id", "device_type"), ("name", "name")]),
};

pub const DEVICE: ResourceKind = ResourceKind {
    name: "device",
    endpoint: Endpoint::Devices,
    required: &["name", "role", "device_type", "site"],
    lookup: Lookup::Field("name"),
};

/// Every interface of one device; used to spot interfaces the node no longer has
pub const DEVICE_INTERFACES: ResourceKind = ResourceKind {
    name: "device interfaces",
    endpoint: Endpoint::Interfaces,
    required: &["device_id"],
    lookup: Lookup::Filter(&[("device_id", "device_id")]),
};

pub const INTERFACE: ResourceKind = ResourceKind {
    name: "interface",
    endpoint: Endpoint::Interfaces,
    required: &["device", "name", "type"],
    lookup: Lookup::Fields(&[("device_id", "device"), ("name", "name")]),
};

pub const BRIDGE_INTERFACE: ResourceKind = ResourceKind {
    name: "bridge interface",
    endpoint: Endpoint::Interfaces,
    required: &["device", "bridge", "name"],
    lookup: Lookup::Fields(&[("device_id", "device"), ("name", "name")]),
};

/// NetBox interface type for a discovered type label
///
/// Bridges themselves are submitted as `bridge`; this mapping covers regular
/// interfaces and templates.
pub fn netbox_interface_type(label: &str) -> &'static str {
    match label {
        "1gbase-t" => "1000base-t",
        "2.5gbase-t" => "2.5gbase-t",
        "10gbase-t" => "10gbase-t",
        "100base-tx" => "100base-tx",
        "bridge" | "vlan" | "virtual" => "virtual",
        "bond" => "lag",
        _ => "other",
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SitePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SitePayload {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            slug: Some(make_slug(name)),
            status: Some("active".to_string()),
            description: None,
        }
    }
}

impl ResourcePayload for SitePayload {
    fn kind(&self) -> ResourceKind {
        SITE
    }
}

/// Name and slug; shared by kinds that need nothing else
#[derive(Debug, Clone, Serialize)]
pub struct NamedPayload {
    #[serde(skip)]
    kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl NamedPayload {
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        Self {
            kind,
            name: Some(name.to_string()),
            slug: Some(make_slug(name)),
        }
    }

    pub fn manufacturer(name: &str) -> Self {
        Self::new(MANUFACTURER, name)
    }

    pub fn platform(name: &str) -> Self {
        Self::new(PLATFORM, name)
    }
}

impl ResourcePayload for NamedPayload {
    fn kind(&self) -> ResourceKind {
        self.kind
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceRolePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_role: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DeviceRolePayload {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            slug: Some(make_slug(name)),
            vm_role: Some(false),
            color: None,
        }
    }
}

impl ResourcePayload for DeviceRolePayload {
    fn kind(&self) -> ResourceKind {
        DEVICE_ROLE
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceTypePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

impl DeviceTypePayload {
    /// A 1U device type
    pub fn new(manufacturer: u64, model: &str) -> Self {
        Self {
            manufacturer: Some(manufacturer),
            model: Some(model.to_string()),
            slug: Some(make_slug(model)),
            u_height: Some(1),
            part_number: None,
        }
    }
}

impl ResourcePayload for DeviceTypePayload {
    fn kind(&self) -> ResourceKind {
        DEVICE_TYPE
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceTemplatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgmt_only: Option<bool>,
}

impl ResourcePayload for InterfaceTemplatePayload {
    fn kind(&self) -> ResourceKind {
        INTERFACE_TEMPLATE
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DevicePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResourcePayload for DevicePayload {
    fn kind(&self) -> ResourceKind {
        DEVICE
    }
}

/// A device interface; `bridge` set means a bridge over another interface
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfacePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResourcePayload for InterfacePayload {
    fn kind(&self) -> ResourceKind {
        if self.bridge.is_some() {
            BRIDGE_INTERFACE
        } else {
            INTERFACE
        }
    }
}
