//! RemoteExecutor trait for mocking

use crate::error::SshError;
use crate::models::{CommandOutput, HostCredentials};

/// Run a command on a host and return its output
///
/// Implementations return stderr as data; deciding whether a non-empty error
/// stream is fatal is left to the caller.
#[async_trait::async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, credentials: &HostCredentials, command: &str) -> Result<CommandOutput, SshError>;
}
