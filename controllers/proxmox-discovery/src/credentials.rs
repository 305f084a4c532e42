//! Interactive collection of per-node SSH credentials.
//!
//! Prompts go through the `Prompter` trait so the collector can be driven by a
//! script in tests; `TerminalPrompter` uses dialoguer and rpassword.

use proxmox_client::ClusterNode;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// Login parameters for one node as supplied by the operator
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginInfo {
    pub ip: Option<String>,
    pub login: Option<String>,
    pub use_pass: bool,
    pub pass: Option<String>,
    pub use_sudo: Option<bool>,
    pub sudo_pass: Option<String>,
}

impl fmt::Debug for LoginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInfo")
            .field("ip", &self.ip)
            .field("login", &self.login)
            .field("use_pass", &self.use_pass)
            .field("pass", &self.pass.as_ref().map(|_| "***"))
            .field("use_sudo", &self.use_sudo)
            .field("sudo_pass", &self.sudo_pass.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("prompt failed: {0}")]
    Prompt(String),
}

fn prompt_err(e: impl fmt::Display) -> CredentialError {
    CredentialError::Prompt(e.to_string())
}

/// Source of operator answers
pub trait Prompter {
    /// Free text (echoed)
    fn input(&mut self, prompt: &str) -> Result<String, CredentialError>;
    /// Yes/no question
    fn confirm(&mut self, prompt: &str) -> Result<bool, CredentialError>;
    /// Hidden input
    fn password(&mut self, prompt: &str) -> Result<String, CredentialError>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String, CredentialError> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, CredentialError> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_err)
    }

    fn password(&mut self, prompt: &str) -> Result<String, CredentialError> {
        rpassword::prompt_password(format!("{}: ", prompt)).map_err(prompt_err)
    }
}

fn required_input(
    prompter: &mut dyn Prompter,
    prompt: &str,
    hidden: bool,
) -> Result<String, CredentialError> {
    loop {
        let answer = if hidden {
            prompter.password(prompt)?
        } else {
            prompter.input(prompt)?
        };
        if answer.trim().is_empty() {
            warn!("A value is required");
            continue;
        }
        // hidden answers are secrets and are kept verbatim
        if hidden {
            return Ok(answer);
        }
        return Ok(answer.trim().to_string());
    }
}

/// Ask for the credentials of every online node, in name order
///
/// Offline nodes are skipped and get no entry in the result.
pub fn collect_credentials(
    prompter: &mut dyn Prompter,
    nodes: &[ClusterNode],
) -> Result<BTreeMap<String, LoginInfo>, CredentialError> {
    let mut ordered: Vec<&ClusterNode> = nodes.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut logins = BTreeMap::new();
    for node in ordered {
        if !node.online {
            warn!("Node {} is offline, skipping", node.name);
            continue;
        }
        info!("Collecting SSH credentials for node {}", node.name);

        let login = required_input(prompter, &format!("SSH login for {}", node.name), false)?;

        let use_pass = prompter.confirm(&format!("Does {}@{} need a password?", login, node.name))?;
        let pass = if use_pass {
            Some(required_input(prompter, &format!("Password for {}@{}", login, node.name), true)?)
        } else {
            None
        };

        let (use_sudo, sudo_pass) = if login == "root" {
            (None, None)
        } else {
            let needs_pass = prompter.confirm(&format!("Does sudo on {} need a password?", node.name))?;
            let sudo_pass = if needs_pass {
                Some(required_input(prompter, &format!("Sudo password for {}@{}", login, node.name), true)?)
            } else {
                None
            };
            (Some(true), sudo_pass)
        };

        logins.insert(
            node.name.clone(),
            LoginInfo {
                ip: node.ip.clone(),
                login: Some(login),
                use_pass,
                pass,
                use_sudo,
                sudo_pass,
            },
        );
    }
    Ok(logins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    enum Answer {
        Text(&'static str),
        Yes,
        No,
    }

    struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        prompts: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
                prompts: Vec::new(),
            }
        }

        fn next_text(&mut self, prompt: &str) -> Result<String, CredentialError> {
            self.prompts.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Text(text)) => Ok(text.to_string()),
                _ => Err(CredentialError::Prompt(format!("unexpected text prompt: {}", prompt))),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&mut self, prompt: &str) -> Result<String, CredentialError> {
            self.next_text(prompt)
        }

        fn confirm(&mut self, prompt: &str) -> Result<bool, CredentialError> {
            self.prompts.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Yes) => Ok(true),
                Some(Answer::No) => Ok(false),
                _ => Err(CredentialError::Prompt(format!("unexpected confirm: {}", prompt))),
            }
        }

        fn password(&mut self, prompt: &str) -> Result<String, CredentialError> {
            self.next_text(prompt)
        }
    }

    fn node(name: &str, online: bool) -> ClusterNode {
        ClusterNode {
            name: name.to_string(),
            ip: Some(format!("10.0.0.{}", name.len())),
            online,
            version: Some("8.2.4".to_string()),
        }
    }

    #[test]
    fn test_root_login_with_password() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("root"), Answer::Yes, Answer::Text("hunter2")]);
        let logins = collect_credentials(&mut prompter, &[node("pve1", true)]).unwrap();

        let info = &logins["pve1"];
        assert_eq!(info.login.as_deref(), Some("root"));
        assert!(info.use_pass);
        assert_eq!(info.pass.as_deref(), Some("hunter2"));
        assert_eq!(info.use_sudo, None);
    }

    #[test]
    fn test_non_root_login_enables_sudo() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("ops"),
            Answer::No,
            Answer::Yes,
            Answer::Text("sudo-pw"),
        ]);
        let logins = collect_credentials(&mut prompter, &[node("pve1", true)]).unwrap();

        let info = &logins["pve1"];
        assert_eq!(info.use_sudo, Some(true));
        assert_eq!(info.sudo_pass.as_deref(), Some("sudo-pw"));
        assert_eq!(info.pass, None);
    }

    #[test]
    fn test_empty_login_is_asked_again() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("  "), Answer::Text("root"), Answer::No]);
        let logins = collect_credentials(&mut prompter, &[node("pve1", true)]).unwrap();

        assert_eq!(logins["pve1"].login.as_deref(), Some("root"));
        assert_eq!(prompter.prompts.len(), 3);
    }

    #[test]
    fn test_hidden_answers_keep_surrounding_spaces() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text(" ops "),
            Answer::Yes,
            Answer::Text("  pass word "),
            Answer::Yes,
            Answer::Text("   "),
            Answer::Text(" sudo pw"),
        ]);
        let logins = collect_credentials(&mut prompter, &[node("pve1", true)]).unwrap();

        let info = &logins["pve1"];
        assert_eq!(info.login.as_deref(), Some("ops"));
        assert_eq!(info.pass.as_deref(), Some("  pass word "));
        assert_eq!(info.sudo_pass.as_deref(), Some(" sudo pw"));
        // the blank sudo password was asked again
        assert_eq!(prompter.prompts.len(), 6);
    }

    #[test]
    fn test_offline_nodes_are_skipped() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("root"), Answer::No]);
        let logins = collect_credentials(&mut prompter, &[node("pve2", false), node("pve1", true)]).unwrap();

        assert_eq!(logins.keys().collect::<Vec<_>>(), vec!["pve1"]);
    }

    #[test]
    fn test_debug_output_masks_passwords() {
        let info = LoginInfo {
            login: Some("ops".to_string()),
            use_pass: true,
            pass: Some("hunter2".to_string()),
            use_sudo: Some(true),
            sudo_pass: Some("sudo-pw".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", info);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("sudo-pw"));
    }
}
