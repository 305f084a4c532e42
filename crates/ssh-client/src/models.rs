//! Credentials and command results

use crate::error::SshError;
use std::fmt;
use std::path::PathBuf;

/// How a command is elevated on the remote host
#[derive(Clone, PartialEq, Eq)]
pub enum Privilege {
    /// Run as the login user (root)
    Direct,
    /// Prefix with `sudo`; the password, if any, is written to stdin
    Sudo { password: Option<String> },
}

/// Everything needed to run a command on one host
#[derive(Clone, PartialEq, Eq)]
pub struct HostCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Password authentication; key authentication when `None`
    pub password: Option<String>,
    pub privilege: Privilege,
}

impl HostCredentials {
    /// The command line actually sent to the host
    pub fn wrap_command(&self, command: &str) -> String {
        match &self.privilege {
            Privilege::Direct => command.to_string(),
            Privilege::Sudo { password: None } => format!("sudo {}", command),
            Privilege::Sudo { password: Some(_) } => format!("sudo -S -p '' {}", command),
        }
    }

    /// Sudo password to feed on stdin, if any
    pub fn sudo_password(&self) -> Option<&str> {
        match &self.privilege {
            Privilege::Sudo { password } => password.as_deref(),
            Privilege::Direct => None,
        }
    }
}

impl fmt::Debug for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privilege::Direct => f.write_str("Direct"),
            Privilege::Sudo { password } => f
                .debug_struct("Sudo")
                .field("password", &password.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

impl fmt::Debug for HostCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("privilege", &self.privilege)
            .finish()
    }
}

/// Output of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: Option<u32>,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_status: Some(0),
        }
    }
}

/// Expand a leading `~/` to the current user's home directory
pub fn expand_home(path: &str) -> Result<PathBuf, SshError> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir().ok_or(SshError::MissingHome)?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}
