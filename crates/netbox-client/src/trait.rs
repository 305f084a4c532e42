//! NetBoxClient trait for mocking
//!
//! This trait abstracts the NetBoxClient to enable mocking in unit tests.
//! The concrete NetBoxClient implements this trait, and tests can use mock implementations.

use crate::common::query::describe_filters;
use crate::error::NetBoxError;
use crate::models::{Endpoint, NetBoxObject};
use serde_json::Value;

/// Trait for NetBox API client operations
///
/// Every collection shares the same four verbs. All async methods must be
/// `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait NetBoxClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), NetBoxError>;

    /// All objects of a collection matching every filter
    async fn filter(
        &self,
        endpoint: Endpoint,
        filters: &[(&str, &str)],
    ) -> Result<Vec<NetBoxObject>, NetBoxError>;

    /// Create an object from a full payload
    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<NetBoxObject, NetBoxError>;

    /// Persist changed fields of an existing object
    async fn update(
        &self,
        endpoint: Endpoint,
        id: u64,
        changes: &Value,
    ) -> Result<NetBoxObject, NetBoxError>;

    /// The single object matching every filter, if any
    ///
    /// More than one match is reported as `NetBoxError::MultipleResults`.
    async fn get(
        &self,
        endpoint: Endpoint,
        filters: &[(&str, &str)],
    ) -> Result<Option<NetBoxObject>, NetBoxError> {
        let mut matches = self.filter(endpoint, filters).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(NetBoxError::MultipleResults {
                endpoint: endpoint.path().to_string(),
                filters: describe_filters(filters),
                count,
            }),
        }
    }
}
