//! Extras resource kinds (tags, custom fields, webhooks, event rules)

use super::{Lookup, ResourceKind, ResourcePayload};
use crate::reconcile_helpers::make_slug;
use netbox_client::Endpoint;
use serde::Serialize;
use serde_json::Value;

pub const TAG: ResourceKind = ResourceKind {
    name: "tag",
    endpoint: Endpoint::Tags,
    required: &["name", "slug"],
    lookup: Lookup::Field("name"),
};

pub const CUSTOM_FIELD: ResourceKind = ResourceKind {
    name: "custom field",
    endpoint: Endpoint::CustomFields,
    required: &["weight", "filter_logic", "search_weight", "object_types", "type", "name"],
    lookup: Lookup::Field("name"),
};

pub const CUSTOM_FIELD_CHOICE_SET: ResourceKind = ResourceKind {
    name: "custom field choice set",
    endpoint: Endpoint::CustomFieldChoiceSets,
    required: &["name", "extra_choices"],
    lookup: Lookup::Field("name"),
};

pub const WEBHOOK: ResourceKind = ResourceKind {
    name: "webhook",
    endpoint: Endpoint::Webhooks,
    required: &[
        "name",
        "ssl_verification",
        "http_method",
        "http_content_type",
        "payload_url",
        "additional_headers",
    ],
    lookup: Lookup::Field("name"),
};

pub const EVENT_RULE: ResourceKind = ResourceKind {
    name: "event rule",
    endpoint: Endpoint::EventRules,
    required: &[
        "name",
        "enabled",
        "object_types",
        "event_types",
        "action_type",
        "action_object_type",
        "action_object_id",
        "conditions",
    ],
    lookup: Lookup::Field("name"),
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TagPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TagPayload {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            slug: Some(make_slug(name)),
            ..Default::default()
        }
    }
}

impl ResourcePayload for TagPayload {
    fn kind(&self) -> ResourceKind {
        TAG
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomFieldPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// `dcim.device`, `virtualization.virtualmachine`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_set: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl ResourcePayload for CustomFieldPayload {
    fn kind(&self) -> ResourceKind {
        CUSTOM_FIELD
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomFieldChoiceSetPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `[value, label]` pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_choices: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_alphabetically: Option<bool>,
}

impl ResourcePayload for CustomFieldChoiceSetPayload {
    fn kind(&self) -> ResourceKind {
        CUSTOM_FIELD_CHOICE_SET
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_verification: Option<bool>,
    /// HMAC key; redacted in logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl ResourcePayload for WebhookPayload {
    fn kind(&self) -> ResourceKind {
        WEBHOOK
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventRulePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_types: Option<Vec<String>>,
    /// `object_created`, `object_updated`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_object_id: Option<u64>,
    /// Condition tree, e.g. `{"attr": "status.value", "value": "active"}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

impl ResourcePayload for EventRulePayload {
    fn kind(&self) -> ResourceKind {
        EVENT_RULE
    }
}
