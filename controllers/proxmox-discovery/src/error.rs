//! Error types for discovery and synchronisation.
//!
//! Node-level errors (configuration, discovery, sync) abort work on one node
//! only; the pipeline records them and moves on to the next node.

use netbox_client::NetBoxError;
use proxmox_client::ProxmoxError;
use ssh_client::SshError;
use thiserror::Error;

/// Missing or invalid operator-supplied data for a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required login field was not provided
    #[error("{node}: missing login field '{field}'")]
    MissingLoginField { node: String, field: &'static str },

    /// Non-root logins can only run the diagnostics through sudo
    #[error("{node}: login '{login}' is not root and sudo is not enabled")]
    SudoRequired { node: String, login: String },

    /// Discovery did not produce data a later stage needs
    #[error("{node}: missing {what}")]
    MissingNodeData { node: String, what: &'static str },
}

/// Malformed `key: value` command output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: continuation '{text}' appears before any key")]
    ContinuationBeforeKey { line: usize, text: String },
}

/// Failure while gathering a node's inventory.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A required command wrote to its error stream
    #[error("{node}: command '{command}' reported an error: {stderr}")]
    Command {
        node: String,
        command: String,
        stderr: String,
    },

    /// The command could not be run at all
    #[error("{node}: could not run '{command}': {source}")]
    Transport {
        node: String,
        command: String,
        #[source]
        source: SshError,
    },

    #[error("{node}: cluster API request failed: {source}")]
    ClusterApi {
        node: String,
        #[source]
        source: ProxmoxError,
    },

    #[error("{node}: output of '{command}' could not be parsed: {source}")]
    Parse {
        node: String,
        command: String,
        #[source]
        source: ParseError,
    },

    /// A query came back empty where data was expected
    #[error("{node}: {what} returned no data")]
    Empty { node: String, what: &'static str },
}

/// Failure of a single reconciliation against NetBox.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A create was attempted without the fields NetBox requires; nothing was written
    #[error("{kind}: missing required fields: {}", .missing.join(", "))]
    MissingRequiredFields {
        kind: &'static str,
        missing: Vec<String>,
    },

    /// Transport or API failure while locating, creating or saving
    #[error("{kind}: {operation} failed: {source}")]
    Reconciliation {
        kind: &'static str,
        operation: &'static str,
        #[source]
        source: NetBoxError,
    },

    /// A filter lookup matched more than one object during reconcile
    #[error("{kind}: lookup {lookup} matched {count} objects")]
    Ambiguous {
        kind: &'static str,
        lookup: String,
        count: usize,
    },

    /// An object that must already exist was not found
    #[error("{kind}: no object matches {lookup}")]
    NotFound { kind: &'static str, lookup: String },

    #[error("{kind}: payload could not be encoded: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of one node (or the cluster prelude) in the sync pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The node never reached the pipeline
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("{node}: bridge {bridge} references member {member}, which has no NetBox interface")]
    UnresolvedBridgeMember {
        node: String,
        bridge: String,
        member: String,
    },
}
