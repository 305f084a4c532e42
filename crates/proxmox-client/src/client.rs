//! Proxmox VE REST API client

use crate::error::ProxmoxError;
use crate::models::{ApiResponse, ClusterStatusEntry, NetworkInterface, NodeVersion};
use crate::proxmox_trait::ProxmoxClientTrait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Connection parameters for the Proxmox API
#[derive(Clone)]
pub struct ProxmoxConnection {
    pub host: String,
    pub port: u16,
    /// `user@realm`
    pub user: String,
    pub token_id: String,
    pub token_secret: String,
    pub verify_ssl: bool,
}

impl fmt::Debug for ProxmoxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("token_id", &self.token_id)
            .field("token_secret", &"***")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// Proxmox VE REST API client
pub struct ProxmoxClient {
    client: Client,
    base_url: String,
    auth_header: String,
}

impl ProxmoxClient {
    /// Create a client for `https://{host}:{port}/api2/json`
    pub fn new(connection: &ProxmoxConnection) -> Result<Self, ProxmoxError> {
        Self::with_base_url(
            format!("https://{}:{}", connection.host, connection.port),
            connection,
        )
    }

    /// Create a client against an explicit base URL (scheme, host and port)
    pub fn with_base_url(base_url: String, connection: &ProxmoxConnection) -> Result<Self, ProxmoxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(!connection.verify_ssl)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/api2/json", base_url.trim_end_matches('/')),
            auth_header: format!(
                "PVEAPIToken={}!{}={}",
                connection.user, connection.token_id, connection.token_secret
            ),
        })
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ProxmoxError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProxmoxError::Authentication(format!("GET {} rejected: {} - {}", path, status, body))
                }
                StatusCode::NOT_FOUND => ProxmoxError::NotFound(format!("{} - {}", path, body)),
                _ => ProxmoxError::Api(format!("GET {} failed: {} - {}", path, status, body)),
            });
        }

        let text = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl ProxmoxClientTrait for ProxmoxClient {
    async fn cluster_status(&self) -> Result<Vec<ClusterStatusEntry>, ProxmoxError> {
        self.get("/cluster/status").await
    }

    async fn node_version(&self, node: &str) -> Result<NodeVersion, ProxmoxError> {
        self.get(&format!("/nodes/{}/version", node)).await
    }

    async fn get_network_config(&self, node: &str) -> Result<Vec<NetworkInterface>, ProxmoxError> {
        let mut interfaces: Vec<NetworkInterface> =
            self.get(&format!("/nodes/{}/network", node)).await?;
        interfaces.sort_by(|a, b| a.iface.cmp(&b.iface));
        Ok(interfaces)
    }
}
