//! Unit tests for reconcile_helpers module

#[cfg(test)]
mod tests {
    use crate::reconcile_helpers::*;
    use netbox_client::NetBoxObject;
    use serde_json::{json, Map, Value};

    fn object(fields: Value) -> NetBoxObject {
        let Value::Object(fields) = fields else {
            panic!("fixture must be an object");
        };
        NetBoxObject {
            id: 1,
            url: "http://netbox/api/dcim/devices/1/".to_string(),
            display: "pve1".to_string(),
            fields,
        }
    }

    fn payload(fields: Value) -> Map<String, Value> {
        match fields {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_make_slug() {
        assert_eq!(make_slug("netbox-proxmox-automation Default Site"), "netbox-proxmox-automation-default-site");
        assert_eq!(make_slug("8.2.4"), "8-2-4");
        assert_eq!(make_slug("Proxmox  Node"), "proxmox-node");
        assert_eq!(make_slug("Acme Corp."), "acme-corp-");
        assert_eq!(make_slug("rack_01"), "rack_01");
    }

    #[test]
    fn test_sanitize_redacts_at_any_depth() {
        let input = payload(json!({
            "name": "hook",
            "secret": "abc",
            "auth": {"token": "t0k3n", "user": "admin"},
            "targets": [{"password": "pw", "host": "a"}, "plain"]
        }));

        let sanitized = sanitize_payload(&input);
        assert_eq!(
            sanitized,
            json!({
                "name": "hook",
                "secret": "***",
                "auth": {"token": "***", "user": "admin"},
                "targets": [{"password": "***", "host": "a"}, "plain"]
            })
        );
    }

    #[test]
    fn test_sanitize_leaves_clean_payload_unchanged() {
        let input = payload(json!({"name": "pve1", "status": "active", "tags": [1, 2]}));
        assert_eq!(sanitize_payload(&input), Value::Object(input.clone()));
    }

    #[test]
    fn test_loose_equality() {
        assert!(loosely_equal(&json!(1.0), &json!(1)));
        assert!(loosely_equal(&json!({"id": 5, "name": "DC1"}), &json!(5)));
        assert!(loosely_equal(&json!({"value": "active", "label": "Active"}), &json!("active")));
        assert!(loosely_equal(&json!(7), &json!("7")));
        assert!(loosely_equal(&Value::Null, &Value::Null));
        assert!(!loosely_equal(&json!({"id": 5}), &json!(6)));
        assert!(!loosely_equal(&json!("enp1s0"), &json!("enp2s0")));
        assert!(!loosely_equal(&Value::Null, &json!("SN123")));
        assert!(!loosely_equal(&json!({"id": 5}), &Value::Null));
    }

    #[test]
    fn test_diff_reports_only_changed_fields() {
        let remote = object(json!({
            "name": "pve1",
            "status": {"value": "active", "label": "Active"},
            "site": {"id": 2, "name": "DC1"},
            "serial": ""
        }));
        let desired = payload(json!({"name": "pve1", "status": "active", "site": 2, "serial": "SN123"}));

        let changes = diff_fields(&remote, &desired);
        assert_eq!(Value::Object(changes), json!({"serial": "SN123"}));
    }

    #[test]
    fn test_diff_nested_mapping_compares_first_key_only() {
        let remote = object(json!({"conditions": {"attr": "status.value", "value": "active"}}));

        let same_first = payload(json!({"conditions": {"attr": "status.value", "value": "offline"}}));
        assert!(diff_fields(&remote, &same_first).is_empty());

        let other_first = payload(json!({"conditions": {"attr": "role.slug", "value": "active"}}));
        let changes = diff_fields(&remote, &other_first);
        assert_eq!(
            changes.get("conditions"),
            Some(&json!({"attr": "role.slug", "value": "active"}))
        );
    }

    #[test]
    fn test_diff_skips_mapping_for_absent_field() {
        let remote = object(json!({"name": "pve1"}));
        let desired = payload(json!({"custom_fields": {"proxmox_node": "pve1"}}));
        assert!(diff_fields(&remote, &desired).is_empty());
    }

    #[test]
    fn test_lookup_value() {
        assert_eq!(lookup_value(&json!("pve1")), Some("pve1".to_string()));
        assert_eq!(lookup_value(&json!(42)), Some("42".to_string()));
        assert_eq!(lookup_value(&json!({"id": 3})), Some("3".to_string()));
        assert_eq!(lookup_value(&Value::Null), None);
    }
}
