//! SSH transport errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SshError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SSH protocol error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Keys(#[from] russh_keys::Error),

    #[error("Authentication failed for {user}@{host}")]
    Authentication { user: String, host: String },

    #[error("Host key for {host} is unknown or changed (checked {known_hosts})")]
    HostKey { host: String, known_hosts: String },

    #[error("Timed out after {seconds}s talking to {host}")]
    Timeout { host: String, seconds: u64 },

    #[error("Cannot determine home directory")]
    MissingHome,
}
