//! Proxmox client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxmoxError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Proxmox API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
