//! SSH command execution
//!
//! Runs diagnostic commands on hypervisor nodes and returns their stdout and
//! stderr. Each command uses its own connection; server host keys are checked
//! against a known-hosts file and unknown keys are rejected.

pub mod client;
pub mod error;
pub mod executor;
pub mod models;

pub use client::SshExecutor;
pub use error::SshError;
pub use executor::RemoteExecutor;
pub use models::{expand_home, CommandOutput, HostCredentials, Privilege};
