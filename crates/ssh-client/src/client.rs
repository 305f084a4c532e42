//! russh-based executor

use crate::error::SshError;
use crate::executor::RemoteExecutor;
use crate::models::{CommandOutput, HostCredentials};
use russh::client;
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::{KeyPair, PublicKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Verifies server keys against a known-hosts file
struct KnownHostsHandler {
    host: String,
    port: u16,
    known_hosts: PathBuf,
}

#[async_trait::async_trait]
impl client::Handler for KnownHostsHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        match russh_keys::check_known_hosts_path(&self.host, self.port, server_public_key, &self.known_hosts) {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(
                    "Host key for {}:{} not found in {}",
                    self.host,
                    self.port,
                    self.known_hosts.display()
                );
                Ok(false)
            }
            Err(e) => {
                warn!("Host key check for {}:{} failed: {}", self.host, self.port, e);
                Ok(false)
            }
        }
    }
}

/// Executes commands over SSH, one connection per command
#[derive(Debug, Clone)]
pub struct SshExecutor {
    known_hosts: PathBuf,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(known_hosts: PathBuf) -> Self {
        Self {
            known_hosts,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set connection and command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connect(&self, credentials: &HostCredentials) -> Result<client::Handle<KnownHostsHandler>, SshError> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(self.timeout),
            ..Default::default()
        });

        let stream = tokio::time::timeout(
            self.timeout,
            TcpStream::connect((credentials.host.as_str(), credentials.port)),
        )
        .await
        .map_err(|_elapsed| self.timed_out(&credentials.host))??;

        let handler = KnownHostsHandler {
            host: credentials.host.clone(),
            port: credentials.port,
            known_hosts: self.known_hosts.clone(),
        };
        let mut session = client::connect_stream(config, stream, handler)
            .await
            .map_err(|e| match e {
                russh::Error::UnknownKey => SshError::HostKey {
                    host: credentials.host.clone(),
                    known_hosts: self.known_hosts.display().to_string(),
                },
                other => SshError::Ssh(other),
            })?;

        let authenticated = match &credentials.password {
            Some(password) => {
                session
                    .authenticate_password(&credentials.username, password)
                    .await?
            }
            None => authenticate_with_default_keys(&mut session, &credentials.username).await?,
        };

        if !authenticated {
            return Err(SshError::Authentication {
                user: credentials.username.clone(),
                host: credentials.host.clone(),
            });
        }
        Ok(session)
    }

    async fn run(&self, credentials: &HostCredentials, command: &str) -> Result<CommandOutput, SshError> {
        let session = self.connect(credentials).await?;
        let mut channel = session.channel_open_session().await?;

        let command_line = credentials.wrap_command(command);
        debug!("Executing on {}: {}", credentials.host, command_line);
        channel.exec(true, command_line).await?;

        if let Some(password) = credentials.sudo_password() {
            let line = format!("{}\n", password);
            channel.data(line.as_bytes()).await?;
        }
        channel.eof().await?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status: status }) => exit_status = Some(status),
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }

        if let Err(e) = session.disconnect(Disconnect::ByApplication, "", "en").await {
            debug!("Disconnect from {} failed: {}", credentials.host, e);
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        })
    }

    fn timed_out(&self, host: &str) -> SshError {
        SshError::Timeout {
            host: host.to_string(),
            seconds: self.timeout.as_secs(),
        }
    }
}

#[async_trait::async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(&self, credentials: &HostCredentials, command: &str) -> Result<CommandOutput, SshError> {
        tokio::time::timeout(self.timeout, self.run(credentials, command))
            .await
            .map_err(|_elapsed| self.timed_out(&credentials.host))?
    }
}

/// Try the usual private keys in `~/.ssh` in turn
async fn authenticate_with_default_keys(
    session: &mut client::Handle<KnownHostsHandler>,
    username: &str,
) -> Result<bool, SshError> {
    let home = dirs::home_dir().ok_or(SshError::MissingHome)?;
    for name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
        let path = home.join(".ssh").join(name);
        if !path.exists() {
            continue;
        }
        let key = match load_private_key(&path).await {
            Ok(key) => key,
            Err(e) => {
                debug!("Skipping key {}: {}", path.display(), e);
                continue;
            }
        };
        if session.authenticate_publickey(username, Arc::new(key)).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn load_private_key(path: &Path) -> Result<KeyPair, SshError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(russh_keys::decode_secret_key(&content, None)?)
}
