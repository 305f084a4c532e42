//! NetBox API models
//!
//! The inventory sync works against many collections with identical verbs, so
//! objects are carried as JSON documents keyed by their NetBox `id` instead of
//! one struct per serializer. Typed payloads live with the callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// NetBox REST collections the sync knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Sites,
    Manufacturers,
    Platforms,
    DeviceRoles,
    DeviceTypes,
    InterfaceTemplates,
    Devices,
    Interfaces,
    MacAddresses,
    ClusterTypes,
    ClusterGroups,
    Clusters,
    VirtualMachines,
    VmInterfaces,
    IpAddresses,
    Tags,
    CustomFields,
    CustomFieldChoiceSets,
    Webhooks,
    EventRules,
}

impl Endpoint {
    /// Collection path below `/api/`
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Sites => "dcim/sites",
            Endpoint::Manufacturers => "dcim/manufacturers",
            Endpoint::Platforms => "dcim/platforms",
            Endpoint::DeviceRoles => "dcim/device-roles",
            Endpoint::DeviceTypes => "dcim/device-types",
            Endpoint::InterfaceTemplates => "dcim/interface-templates",
            Endpoint::Devices => "dcim/devices",
            Endpoint::Interfaces => "dcim/interfaces",
            Endpoint::MacAddresses => "dcim/mac-addresses",
            Endpoint::ClusterTypes => "virtualization/cluster-types",
            Endpoint::ClusterGroups => "virtualization/cluster-groups",
            Endpoint::Clusters => "virtualization/clusters",
            Endpoint::VirtualMachines => "virtualization/virtual-machines",
            Endpoint::VmInterfaces => "virtualization/interfaces",
            Endpoint::IpAddresses => "ipam/ip-addresses",
            Endpoint::Tags => "extras/tags",
            Endpoint::CustomFields => "extras/custom-fields",
            Endpoint::CustomFieldChoiceSets => "extras/custom-field-choice-sets",
            Endpoint::Webhooks => "extras/webhooks",
            Endpoint::EventRules => "extras/event-rules",
        }
    }

    /// List URL path, e.g. `/api/dcim/sites/`
    pub fn list_path(self) -> String {
        format!("/api/{}/", self.path())
    }

    /// Detail URL path, e.g. `/api/dcim/sites/7/`
    pub fn detail_path(self, id: u64) -> String {
        format!("/api/{}/{}/", self.path(), id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A NetBox object as returned by any collection endpoint
///
/// `id`, `url` and `display` are common to every serializer; everything else
/// is kept verbatim in `fields`, including nested references such as
/// `{"id": 3, "name": "DC1", ...}` and choice values such as
/// `{"value": "active", "label": "Active"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetBoxObject {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub display: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NetBoxObject {
    /// Raw value of a field, if the serializer returned it
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether the serializer returned the field at all (even as `null`)
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field on the in-memory copy
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Identifier of a referenced object, whether nested (`{"id": n}`) or flat
    pub fn reference_id(&self, key: &str) -> Option<u64> {
        match self.field(key)? {
            Value::Number(n) => n.as_u64(),
            Value::Object(nested) => nested.get("id").and_then(Value::as_u64),
            _ => None,
        }
    }

    /// The object's `name` field, when it has one
    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }
}
