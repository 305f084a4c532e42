//! Reconciliation of desired payloads against NetBox.
//!
//! One generic protocol serves every resource kind. A `ResourceKind` names the
//! collection, the fields NetBox needs to create an object and the lookup that
//! identifies an existing one. `reconcile` locates the object, then either
//! updates the fields that differ or creates it.
//!
//! Kinds and their typed payloads are organized by NetBox API section:
//! - `dcim`: sites, manufacturers, platforms, roles, device types, devices, interfaces
//! - `mac_address`: MAC address objects and primary MAC binding
//! - `virtualization`: cluster types, groups, clusters, virtual machines
//! - `ipam`: IP addresses
//! - `extras`: tags, custom fields, webhooks, event rules

pub mod dcim;
#[allow(dead_code, reason = "kinds reconcilable but not driven by the node sync")]
pub mod extras;
pub mod ipam;
pub mod mac_address;
#[allow(dead_code, reason = "kinds reconcilable but not driven by the node sync")]
pub mod virtualization;

use crate::error::ReconcileError;
use crate::reconcile_helpers::{diff_fields, lookup_value, sanitize_payload, sanitize_value};
use netbox_client::{Endpoint, NetBoxClientTrait, NetBoxObject};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Desired field values for one object
pub type Payload = Map<String, Value>;

/// How an existing object is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Equality on one payload field, queried under the same name
    Field(&'static str),
    /// Equality on several fields: `(query parameter, payload field)`
    Fields(&'static [(&'static str, &'static str)]),
    /// Filter that may match any number of objects
    Filter(&'static [(&'static str, &'static str)]),
}

/// Static description of a NetBox resource kind
#[derive(Debug, Clone, Copy)]
pub struct ResourceKind {
    pub name: &'static str,
    pub endpoint: Endpoint,
    pub required: &'static [&'static str],
    pub lookup: Lookup,
}

impl ResourceKind {
    /// Same kind, located by a different key
    pub const fn with_lookup(self, lookup: Lookup) -> Self {
        Self { lookup, ..self }
    }

    /// Required fields absent (or null) in the payload
    pub fn missing_fields(&self, payload: &Payload) -> Vec<String> {
        self.required
            .iter()
            .filter(|field| payload.get(**field).is_none_or(Value::is_null))
            .map(|field| field.to_string())
            .collect()
    }

    fn lookup_query(&self, lookup: Lookup, payload: &Payload) -> Result<Vec<(&'static str, String)>, ReconcileError> {
        let pairs: Vec<(&'static str, &'static str)> = match lookup {
            Lookup::Field(field) => vec![(field, field)],
            Lookup::Fields(pairs) | Lookup::Filter(pairs) => pairs.to_vec(),
        };

        let mut query = Vec::with_capacity(pairs.len());
        let mut missing = Vec::new();
        for (param, field) in pairs {
            match payload.get(field).and_then(lookup_value) {
                Some(value) => query.push((param, value)),
                None => missing.push(field.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ReconcileError::MissingRequiredFields {
                kind: self.name,
                missing,
            });
        }
        Ok(query)
    }
}

/// A typed payload for one resource kind
pub trait ResourcePayload: Serialize {
    fn kind(&self) -> ResourceKind;

    /// JSON object handed to the engine; `None` fields are omitted
    fn to_payload(&self) -> Result<Payload, ReconcileError> {
        serde_json::to_value(self)
            .and_then(serde_json::from_value)
            .map_err(|source| ReconcileError::Payload {
                kind: self.kind().name,
                source,
            })
    }
}

/// Result of `locate`
#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    One(Option<NetBoxObject>),
    Many(Vec<NetBoxObject>),
}

/// What `reconcile` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated(Vec<String>),
    Unchanged,
}

/// The converged object and how it got there
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub object: NetBoxObject,
    pub outcome: Outcome,
}

impl Reconciled {
    pub fn id(&self) -> u64 {
        self.object.id
    }
}

/// Find the existing object(s) for a payload using the kind's lookup
pub async fn locate(
    client: &dyn NetBoxClientTrait,
    kind: &ResourceKind,
    payload: &Payload,
) -> Result<Located, ReconcileError> {
    let query = kind.lookup_query(kind.lookup, payload)?;
    let filters: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let located = match kind.lookup {
        Lookup::Filter(_) => client.filter(kind.endpoint, &filters).await.map(Located::Many),
        Lookup::Field(_) | Lookup::Fields(_) => client.get(kind.endpoint, &filters).await.map(Located::One),
    };
    located.map_err(|source| ReconcileError::Reconciliation {
        kind: kind.name,
        operation: "locate",
        source,
    })
}

/// Converge NetBox towards the payload: update what differs, or create
pub async fn reconcile(
    client: &dyn NetBoxClientTrait,
    kind: &ResourceKind,
    payload: &Payload,
) -> Result<Reconciled, ReconcileError> {
    debug!("Reconciling {} with payload {}", kind.name, sanitize_payload(payload));

    let existing = match locate(client, kind, payload).await? {
        Located::One(found) => found,
        Located::Many(mut found) => match found.len() {
            0 => None,
            1 => found.pop(),
            count => {
                let query = kind.lookup_query(kind.lookup, payload)?;
                return Err(ReconcileError::Ambiguous {
                    kind: kind.name,
                    lookup: format!("{:?}", query),
                    count,
                });
            }
        },
    };

    match existing {
        Some(object) => converge(client, kind, object, payload).await,
        None => create(client, kind, payload).await,
    }
}

/// `reconcile` for a typed payload
pub async fn reconcile_payload<P>(client: &dyn NetBoxClientTrait, resource: &P) -> Result<Reconciled, ReconcileError>
where
    P: ResourcePayload + Sync,
{
    let kind = resource.kind();
    let payload = resource.to_payload()?;
    reconcile(client, &kind, &payload).await
}

/// Update an existing object with every payload field that differs
///
/// All changes go out in a single PATCH; nothing is sent when nothing differs.
pub async fn converge(
    client: &dyn NetBoxClientTrait,
    kind: &ResourceKind,
    object: NetBoxObject,
    payload: &Payload,
) -> Result<Reconciled, ReconcileError> {
    let changes = diff_fields(&object, payload);
    if changes.is_empty() {
        debug!("{} {} (ID: {}) is up to date", kind.name, object.display, object.id);
        return Ok(Reconciled {
            object,
            outcome: Outcome::Unchanged,
        });
    }

    let fields: Vec<String> = changes.keys().cloned().collect();
    for (key, value) in &changes {
        info!(
            "Updating {} {} (ID: {}): {} -> {}",
            kind.name,
            object.display,
            object.id,
            key,
            sanitize_value(key, value)
        );
    }

    let saved = client
        .update(kind.endpoint, object.id, &Value::Object(changes))
        .await
        .map_err(|source| ReconcileError::Reconciliation {
            kind: kind.name,
            operation: "save",
            source,
        })?;

    Ok(Reconciled {
        object: saved,
        outcome: Outcome::Updated(fields),
    })
}

async fn create(
    client: &dyn NetBoxClientTrait,
    kind: &ResourceKind,
    payload: &Payload,
) -> Result<Reconciled, ReconcileError> {
    let missing = kind.missing_fields(payload);
    if !missing.is_empty() {
        warn!("Not creating {}: missing required fields {}", kind.name, missing.join(", "));
        return Err(ReconcileError::MissingRequiredFields {
            kind: kind.name,
            missing,
        });
    }

    let created = client
        .create(kind.endpoint, &Value::Object(payload.clone()))
        .await
        .map_err(|source| ReconcileError::Reconciliation {
            kind: kind.name,
            operation: "create",
            source,
        })?;
    info!("Created {} {} in NetBox (ID: {})", kind.name, created.display, created.id);
    debug!("Created {} from payload {}", kind.name, sanitize_payload(payload));

    // Read the object back the way later runs will find it
    let relocated = match locate(client, &kind.with_lookup(relocation_lookup(kind, payload)), payload).await? {
        Located::One(found) => found,
        Located::Many(found) => found.into_iter().find(|o| o.id == created.id),
    };
    let object = match relocated {
        Some(object) => object,
        None => {
            warn!(
                "Created {} (ID: {}) could not be located again; using the create response",
                kind.name, created.id
            );
            created
        }
    };

    Ok(Reconciled {
        object,
        outcome: Outcome::Created,
    })
}

/// Key used to read back a created object: the kind's multi-field key, else
/// `name`, `model` or `address`, else the kind's own lookup
fn relocation_lookup(kind: &ResourceKind, payload: &Payload) -> Lookup {
    if let Lookup::Fields(_) = kind.lookup {
        return kind.lookup;
    }
    ["name", "model", "address"]
        .into_iter()
        .find(|key| payload.contains_key(*key))
        .map(Lookup::Field)
        .unwrap_or(kind.lookup)
}
