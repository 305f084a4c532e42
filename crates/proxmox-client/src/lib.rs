//! Proxmox VE API Client
//!
//! Read-only client for the parts of the Proxmox VE REST API the inventory
//! sync needs: cluster membership, node versions and node network configuration.
//! Authentication uses API tokens (`PVEAPIToken=USER@REALM!TOKENID=SECRET`).

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod proxmox_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{ProxmoxClient, ProxmoxConnection};
pub use error::ProxmoxError;
pub use models::*;
pub use proxmox_trait::ProxmoxClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockProxmoxClient;
