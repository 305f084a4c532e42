//! Sync pipeline
//!
//! Files discovered nodes into NetBox in a fixed order. The cluster prelude
//! (site, cluster type, cluster group, cluster) runs once and is fatal for the
//! run. Each node then goes through manufacturer, platform, role, device type,
//! interface templates, device, interfaces, bridges and addresses; a failure
//! stops that node only.

use crate::config::NetBoxSettings;
use crate::discovery::records::{InterfaceRecord, NodeRecord};
use crate::error::{ConfigurationError, DiscoveryError, SyncError};
use crate::reconciler::dcim::{
    netbox_interface_type, DeviceRolePayload, DevicePayload, DeviceTypePayload, InterfacePayload,
    InterfaceTemplatePayload, NamedPayload, SitePayload, DEVICE_INTERFACES,
};
use crate::reconciler::ipam::IpAddressPayload;
use crate::reconciler::mac_address::{bind_mac_address, InterfaceOwner};
use crate::reconciler::virtualization::{ClusterClassPayload, ClusterPayload};
use crate::reconciler::{locate, reconcile_payload, Located, Outcome, Payload, Reconciled};
use netbox_client::NetBoxClientTrait;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

pub const DEFAULT_SITE: &str = "netbox-proxmox-automation Default Site";
pub const DEFAULT_CLUSTER_TYPE: &str = "Proxmox";
pub const DEFAULT_DEVICE_ROLE: &str = "Proxmox Node";

/// Names of the shared objects every node is filed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub site: String,
    pub cluster_name: String,
    pub cluster_type: String,
    pub cluster_group: String,
    pub device_role: String,
}

impl SyncSettings {
    /// Defaults with the operator's overrides applied; the group defaults to the site
    pub fn new(cluster_name: impl Into<String>, overrides: &NetBoxSettings) -> Self {
        let site = overrides.site.clone().unwrap_or_else(|| DEFAULT_SITE.to_string());
        Self {
            cluster_name: cluster_name.into(),
            cluster_type: overrides
                .cluster_role
                .clone()
                .unwrap_or_else(|| DEFAULT_CLUSTER_TYPE.to_string()),
            cluster_group: overrides.cluster_group.clone().unwrap_or_else(|| site.clone()),
            device_role: overrides
                .device_role
                .clone()
                .unwrap_or_else(|| DEFAULT_DEVICE_ROLE.to_string()),
            site,
        }
    }
}

/// Count of reconcile outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl Tally {
    fn record(&mut self, reconciled: &Reconciled) -> u64 {
        match reconciled.outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated(_) => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
        reconciled.id()
    }
}

/// What was filed for one node
#[derive(Debug)]
pub struct NodeSummary {
    pub node: String,
    pub device_id: u64,
    pub interfaces: usize,
    pub ip_addresses: usize,
    pub mac_addresses: usize,
    pub changes: Tally,
    /// Address and MAC bindings that failed; the rest of the node was still filed
    pub errors: Vec<SyncError>,
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub cluster_id: u64,
    pub synced: Vec<NodeSummary>,
    pub failed: Vec<(String, SyncError)>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Nodes that failed outright or had a failed address or MAC binding
    pub fn failure_count(&self) -> usize {
        self.failed.len() + self.synced.iter().filter(|s| !s.errors.is_empty()).count()
    }

    pub fn log(&self) {
        for summary in &self.synced {
            info!(
                "Node {}: device {} with {} interfaces, {} IP addresses, {} MAC addresses ({} created, {} updated, {} unchanged)",
                summary.node,
                summary.device_id,
                summary.interfaces,
                summary.ip_addresses,
                summary.mac_addresses,
                summary.changes.created,
                summary.changes.updated,
                summary.changes.unchanged
            );
            for e in &summary.errors {
                error!("Node {}: {}", summary.node, e);
            }
        }
        for (node, e) in &self.failed {
            error!("Node {} failed: {}", node, e);
        }
        info!(
            "Sync finished: {} nodes synced, {} failed",
            self.synced.len(),
            self.failed.len()
        );
    }
}

/// Shared objects created by the cluster prelude
#[derive(Debug, Clone, Copy)]
struct ClusterRefs {
    site: u64,
    cluster: u64,
}

/// Drives reconciliation of discovered nodes
pub struct SyncPipeline<'a> {
    client: &'a dyn NetBoxClientTrait,
    settings: &'a SyncSettings,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(client: &'a dyn NetBoxClientTrait, settings: &'a SyncSettings) -> Self {
        Self { client, settings }
    }

    /// Sync every discovered node; nodes that failed discovery are reported as failed
    ///
    /// Only a failure of the cluster prelude is returned as an error.
    pub async fn run(
        &self,
        discovered: Vec<(String, Result<NodeRecord, DiscoveryError>)>,
    ) -> Result<SyncReport, SyncError> {
        let refs = self.sync_cluster().await?;
        let mut report = SyncReport {
            cluster_id: refs.cluster,
            ..Default::default()
        };

        for (name, result) in discovered {
            let node = match result {
                Ok(node) => node,
                Err(e) => {
                    report.failed.push((name, e.into()));
                    continue;
                }
            };
            match self.sync_node(&node, refs).await {
                Ok(summary) => {
                    info!("Synced node {}", node.name);
                    report.synced.push(summary);
                }
                Err(e) => {
                    warn!("Sync of node {} failed: {}", node.name, e);
                    report.failed.push((name, e));
                }
            }
        }
        Ok(report)
    }

    async fn sync_cluster(&self) -> Result<ClusterRefs, SyncError> {
        let settings = self.settings;
        info!("Syncing cluster {} into site {}", settings.cluster_name, settings.site);

        let site = reconcile_payload(self.client, &SitePayload::new(&settings.site)).await?;
        let cluster_type =
            reconcile_payload(self.client, &ClusterClassPayload::cluster_type(&settings.cluster_type)).await?;
        let cluster_group =
            reconcile_payload(self.client, &ClusterClassPayload::cluster_group(&settings.cluster_group)).await?;
        let cluster = reconcile_payload(
            self.client,
            &ClusterPayload {
                name: Some(settings.cluster_name.clone()),
                cluster_type: Some(cluster_type.id()),
                group: Some(cluster_group.id()),
                status: Some("active".to_string()),
                ..Default::default()
            },
        )
        .await?;

        Ok(ClusterRefs {
            site: site.id(),
            cluster: cluster.id(),
        })
    }

    async fn sync_node(&self, node: &NodeRecord, refs: ClusterRefs) -> Result<NodeSummary, SyncError> {
        let mut tally = Tally::default();
        let system = &node.system;
        let missing = |what: &'static str| ConfigurationError::MissingNodeData {
            node: node.name.clone(),
            what,
        };

        let manufacturer_name = system.manufacturer.as_deref().ok_or_else(|| missing("manufacturer"))?;
        let model = system.model.as_deref().ok_or_else(|| missing("model"))?;
        let version = node.version.as_deref().ok_or_else(|| missing("version"))?;

        let manufacturer = tally.record(
            &reconcile_payload(self.client, &NamedPayload::manufacturer(manufacturer_name)).await?,
        );
        let platform = tally.record(&reconcile_payload(self.client, &NamedPayload::platform(version)).await?);
        let role = tally.record(
            &reconcile_payload(self.client, &DeviceRolePayload::new(&self.settings.device_role)).await?,
        );
        let device_type =
            tally.record(&reconcile_payload(self.client, &DeviceTypePayload::new(manufacturer, model)).await?);

        for (name, iface) in system.network_interfaces.iter().filter(|(_, i)| !i.is_bridge()) {
            let template = InterfaceTemplatePayload {
                device_type: Some(device_type),
                name: Some(name.clone()),
                interface_type: Some(netbox_interface_type(iface.interface_type.as_str()).to_string()),
                enabled: Some(false),
                ..Default::default()
            };
            tally.record(&reconcile_payload(self.client, &template).await?);
        }

        let device = tally.record(
            &reconcile_payload(
                self.client,
                &DevicePayload {
                    name: Some(node.name.clone()),
                    role: Some(role),
                    device_type: Some(device_type),
                    site: Some(refs.site),
                    platform: Some(platform),
                    cluster: Some(refs.cluster),
                    serial: system.serial.clone(),
                    status: Some("active".to_string()),
                },
            )
            .await?,
        );

        let mut collected = self.sync_regular_interfaces(device, node, &mut tally).await?;
        let bridges = self.sync_bridges(device, node, &collected, &mut tally).await?;
        collected.extend(bridges);
        self.warn_stale_interfaces(device, node).await;

        let mut ip_addresses = 0;
        let mut mac_addresses = 0;
        let mut errors: Vec<SyncError> = Vec::new();
        for (name, interface_id) in &collected {
            let Some(iface) = system.network_interfaces.get(name) else {
                continue;
            };
            for address in [&iface.ipv4address, &iface.ipv6address].into_iter().flatten() {
                let payload = IpAddressPayload::assigned(address, InterfaceOwner::Device, *interface_id);
                match reconcile_payload(self.client, &payload).await {
                    Ok(reconciled) => {
                        tally.record(&reconciled);
                        ip_addresses += 1;
                    }
                    Err(e) => {
                        warn!("Address {} on {}/{} failed: {}", address, node.name, name, e);
                        errors.push(e.into());
                    }
                }
            }
            if !iface.mac.trim().is_empty() {
                match bind_mac_address(self.client, InterfaceOwner::Device, device, name, &iface.mac, iface.enabled)
                    .await
                {
                    Ok(bound) => {
                        tally.record(&bound);
                        mac_addresses += 1;
                    }
                    Err(e) => {
                        warn!("MAC {} on {}/{} failed: {}", iface.mac, node.name, name, e);
                        errors.push(e.into());
                    }
                }
            }
        }

        Ok(NodeSummary {
            node: node.name.clone(),
            device_id: device,
            interfaces: collected.len(),
            ip_addresses,
            mac_addresses,
            changes: tally,
            errors,
        })
    }

    /// Reconcile every non-bridge interface; returns interface ids by name
    pub async fn sync_regular_interfaces(
        &self,
        device: u64,
        node: &NodeRecord,
        tally: &mut Tally,
    ) -> Result<BTreeMap<String, u64>, SyncError> {
        let mut collected = BTreeMap::new();
        for (name, iface) in node.system.network_interfaces.iter().filter(|(_, i)| !i.is_bridge()) {
            let payload = InterfacePayload {
                device: Some(device),
                name: Some(name.clone()),
                interface_type: Some(netbox_interface_type(iface.interface_type.as_str()).to_string()),
                enabled: Some(iface.enabled),
                ..Default::default()
            };
            let id = tally.record(&reconcile_payload(self.client, &payload).await?);
            collected.insert(name.clone(), id);
        }
        Ok(collected)
    }

    /// Reconcile bridges over interfaces already in `collected`
    ///
    /// A bridge whose member is not in `collected` fails the node.
    pub async fn sync_bridges(
        &self,
        device: u64,
        node: &NodeRecord,
        collected: &BTreeMap<String, u64>,
        tally: &mut Tally,
    ) -> Result<BTreeMap<String, u64>, SyncError> {
        let mut bridges = BTreeMap::new();
        for (name, iface) in &node.system.network_interfaces {
            let Some(member) = iface.bridge_ports.as_deref() else {
                continue;
            };
            let member_id = *collected.get(member).ok_or_else(|| SyncError::UnresolvedBridgeMember {
                node: node.name.clone(),
                bridge: name.clone(),
                member: member.to_string(),
            })?;
            let payload = bridge_payload(device, name, iface, member_id);
            let id = tally.record(&reconcile_payload(self.client, &payload).await?);
            bridges.insert(name.clone(), id);
        }
        Ok(bridges)
    }

    /// Warn about NetBox interfaces of the device that the node no longer reports
    async fn warn_stale_interfaces(&self, device: u64, node: &NodeRecord) {
        let mut query = Payload::new();
        query.insert("device_id".to_string(), Value::from(device));
        let existing = match locate(self.client, &DEVICE_INTERFACES, &query).await {
            Ok(Located::Many(existing)) => existing,
            Ok(Located::One(_)) => return,
            Err(e) => {
                warn!("Could not list NetBox interfaces of {}: {}", node.name, e);
                return;
            }
        };
        for object in existing {
            let name = object.name().unwrap_or(object.display.as_str());
            if !node.system.network_interfaces.contains_key(name) {
                warn!(
                    "Interface {} of device {} exists in NetBox but was not discovered on the node",
                    name, node.name
                );
            }
        }
    }
}

fn bridge_payload(device: u64, name: &str, iface: &InterfaceRecord, member_id: u64) -> InterfacePayload {
    InterfacePayload {
        device: Some(device),
        name: Some(name.to_string()),
        interface_type: Some("bridge".to_string()),
        enabled: Some(iface.enabled),
        bridge: Some(member_id),
        ..Default::default()
    }
}
