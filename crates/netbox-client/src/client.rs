//! NetBox API client
//!
//! Implements the generic collection verbs over the NetBox REST API
//! (`/api/<app>/<collection>/` and `/api/<app>/<collection>/<id>/`).

use crate::common::{query, HttpClient};
use crate::error::NetBoxError;
use crate::models::{Endpoint, NetBoxObject};
use crate::netbox_trait::NetBoxClientTrait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// NetBox API client
pub struct NetBoxClient {
    http: HttpClient,
}

impl NetBoxClient {
    /// Create a new NetBox client
    ///
    /// # Arguments
    /// * `base_url` - NetBox base URL (e.g., "https://netbox:443")
    /// * `token` - API token for authentication
    /// * `verify_ssl` - verify the server certificate; self-signed lab
    ///   installs usually need `false`
    pub fn new(base_url: String, token: String, verify_ssl: bool) -> Result<Self, NetBoxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(NetBoxError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a simple authenticated request.
    ///
    /// Uses the status endpoint as it's lightweight and requires authentication.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and NetBox is reachable
    /// * `Err(NetBoxError)` - Token is invalid or NetBox is unreachable
    pub async fn validate_token(&self) -> Result<(), NetBoxError> {
        debug!("Validating NetBox token and connectivity");
        let _status: Value = self.http.get("/api/status/").await?;
        debug!("NetBox token validated successfully");
        Ok(())
    }
}

#[async_trait::async_trait]
impl NetBoxClientTrait for NetBoxClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        NetBoxClient::validate_token(self).await
    }

    async fn filter(
        &self,
        endpoint: Endpoint,
        filters: &[(&str, &str)],
    ) -> Result<Vec<NetBoxObject>, NetBoxError> {
        query::query_resources(&self.http, endpoint, filters, true).await
    }

    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<NetBoxObject, NetBoxError> {
        if !payload.is_object() {
            return Err(NetBoxError::InvalidRequest(format!(
                "create on {} requires a JSON object payload",
                endpoint
            )));
        }
        self.http.post(&endpoint.list_path(), payload).await
    }

    async fn update(
        &self,
        endpoint: Endpoint,
        id: u64,
        changes: &Value,
    ) -> Result<NetBoxObject, NetBoxError> {
        if !changes.is_object() {
            return Err(NetBoxError::InvalidRequest(format!(
                "update of {} {} requires a JSON object payload",
                endpoint, id
            )));
        }
        self.http.patch(&endpoint.detail_path(id), changes).await
    }
}
