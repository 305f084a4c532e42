//! NetBox REST API Client
//!
//! A small client for the NetBox REST API that treats every collection the same
//! way: objects are located with query filters, created with a POST of the full
//! payload and updated with a PATCH carrying only the changed fields.
//!
//! # Example
//!
//! ```no_run
//! use netbox_client::{Endpoint, NetBoxClient, NetBoxClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NetBoxClient::new(
//!     "https://netbox.example.com:443".to_string(),
//!     "your-api-token".to_string(),
//!     true,
//! )?;
//!
//! // Look up a site by name
//! let site = client.get(Endpoint::Sites, &[("name", "DC1")]).await?;
//!
//! // Every interface of device 42
//! let interfaces = client.filter(Endpoint::Interfaces, &[("device_id", "42")]).await?;
//! # let _ = (site, interfaces);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Generic collections**: one set of verbs for DCIM, IPAM, virtualization and extras
//! - **Pagination**: filters follow `next` links until the result set is complete
//! - **Mocking**: `MockNetBoxClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod netbox_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::NetBoxClient;
pub use common::{HttpClient, PaginatedResponse};
pub use error::NetBoxError;
pub use models::*;
pub use netbox_trait::NetBoxClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockNetBoxClient;
