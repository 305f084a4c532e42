//! Mock NetBoxClient for unit testing
//!
//! This module provides a mock implementation of NetBoxClientTrait that can be used
//! in unit tests without requiring a running NetBox instance.
//!
//! Objects are stored per collection in memory. Filters follow NetBox
//! conventions closely enough for the sync: `<field>_id` matches a nested
//! reference, choice fields match on their `value`. Create and update calls are
//! counted so tests can assert that nothing was written.

mod helpers;

use crate::error::NetBoxError;
use crate::models::{Endpoint, NetBoxObject};
use crate::netbox_trait::NetBoxClientTrait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MockState {
    objects: BTreeMap<Endpoint, BTreeMap<u64, NetBoxObject>>,
    next_id: u64,
    create_calls: usize,
    update_calls: usize,
    fail_writes: bool,
}

/// Mock NetBoxClient for testing
#[derive(Debug, Clone)]
pub struct MockNetBoxClient {
    base_url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockNetBoxClient {
    /// Create a new, empty mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object (for test setup); not counted as a write
    pub fn insert(&self, endpoint: Endpoint, fields: Value) -> NetBoxObject {
        let mut state = self.state();
        let object = self.materialize(&mut state, endpoint, fields);
        state
            .objects
            .entry(endpoint)
            .or_default()
            .insert(object.id, object.clone());
        object
    }

    /// All stored objects of a collection, ordered by id
    pub fn objects(&self, endpoint: Endpoint) -> Vec<NetBoxObject> {
        self.state()
            .objects
            .get(&endpoint)
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default()
    }

    /// A stored object by id
    pub fn object(&self, endpoint: Endpoint, id: u64) -> Option<NetBoxObject> {
        self.state()
            .objects
            .get(&endpoint)
            .and_then(|objects| objects.get(&id))
            .cloned()
    }

    /// Number of create calls received
    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    /// Number of update calls received
    pub fn update_calls(&self) -> usize {
        self.state().update_calls
    }

    /// Total number of write calls received
    pub fn write_calls(&self) -> usize {
        let state = self.state();
        state.create_calls + state.update_calls
    }

    /// Make every subsequent create/update fail with an API error
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    fn materialize(&self, state: &mut MockState, endpoint: Endpoint, fields: Value) -> NetBoxObject {
        state.next_id += 1;
        let id = state.next_id;
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.remove("id");
        let now = chrono::Utc::now().to_rfc3339();
        fields.insert("created".to_string(), Value::String(now.clone()));
        fields.insert("last_updated".to_string(), Value::String(now));

        NetBoxObject {
            id,
            url: format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.detail_path(id)),
            display: helpers::display_name(&fields, id),
            fields,
        }
    }
}

#[async_trait::async_trait]
impl NetBoxClientTrait for MockNetBoxClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        Ok(())
    }

    async fn filter(
        &self,
        endpoint: Endpoint,
        filters: &[(&str, &str)],
    ) -> Result<Vec<NetBoxObject>, NetBoxError> {
        Ok(self
            .state()
            .objects
            .get(&endpoint)
            .map(|objects| {
                objects
                    .values()
                    .filter(|object| helpers::matches_all(object, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<NetBoxObject, NetBoxError> {
        let mut state = self.state();
        state.create_calls += 1;
        if state.fail_writes {
            return Err(NetBoxError::Api(format!(
                "POST {} failed: 500 Internal Server Error - mock write failure",
                endpoint.list_path()
            )));
        }
        if !payload.is_object() {
            return Err(NetBoxError::InvalidRequest(format!(
                "create on {} requires a JSON object payload",
                endpoint
            )));
        }

        let object = self.materialize(&mut state, endpoint, payload.clone());
        state
            .objects
            .entry(endpoint)
            .or_default()
            .insert(object.id, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        endpoint: Endpoint,
        id: u64,
        changes: &Value,
    ) -> Result<NetBoxObject, NetBoxError> {
        let mut state = self.state();
        state.update_calls += 1;
        if state.fail_writes {
            return Err(NetBoxError::Api(format!(
                "PATCH {} failed: 500 Internal Server Error - mock write failure",
                endpoint.detail_path(id)
            )));
        }
        let Value::Object(changes) = changes else {
            return Err(NetBoxError::InvalidRequest(format!(
                "update of {} {} requires a JSON object payload",
                endpoint, id
            )));
        };

        let object = state
            .objects
            .get_mut(&endpoint)
            .and_then(|objects| objects.get_mut(&id))
            .ok_or_else(|| NetBoxError::NotFound(format!("Resource not found: {}", endpoint.detail_path(id))))?;
        for (key, value) in changes {
            object.set_field(key.clone(), value.clone());
        }
        object.set_field("last_updated", Value::String(chrono::Utc::now().to_rfc3339()));
        Ok(object.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_filter_matches_nested_reference_by_id_suffix() {
        let mock = MockNetBoxClient::new("http://netbox");
        mock.insert(Endpoint::Interfaces, json!({"name": "eth0", "device": {"id": 7, "name": "pve1"}}));
        mock.insert(Endpoint::Interfaces, json!({"name": "eth0", "device": {"id": 8, "name": "pve2"}}));

        let found = mock
            .get(Endpoint::Interfaces, &[("device_id", "8"), ("name", "eth0")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.reference_id("device"), Some(8));
    }

    #[tokio::test]
    async fn test_get_with_two_matches_is_an_error() {
        let mock = MockNetBoxClient::new("http://netbox");
        mock.insert(Endpoint::Sites, json!({"name": "DC1"}));
        mock.insert(Endpoint::Sites, json!({"name": "DC1"}));

        let result = mock.get(Endpoint::Sites, &[("name", "DC1")]).await;
        assert!(matches!(result, Err(NetBoxError::MultipleResults { count: 2, .. })));
    }

    #[tokio::test]
    async fn test_writes_are_counted_and_can_fail() {
        let mock = MockNetBoxClient::new("http://netbox");
        let site = mock.create(Endpoint::Sites, &json!({"name": "DC1"})).await.unwrap();
        mock.update(Endpoint::Sites, site.id, &json!({"status": "active"})).await.unwrap();
        assert_eq!(mock.create_calls(), 1);
        assert_eq!(mock.update_calls(), 1);

        mock.fail_writes(true);
        assert!(mock.create(Endpoint::Sites, &json!({"name": "DC2"})).await.is_err());
        assert_eq!(mock.objects(Endpoint::Sites).len(), 1);
        assert_eq!(mock.write_calls(), 3);
    }
}
