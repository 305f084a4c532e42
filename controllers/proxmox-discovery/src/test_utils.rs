//! Test utilities for discovery and sync tests
//!
//! Canned command output, a scripted SSH executor and builders for node records.

#[cfg(test)]
use crate::discovery::records::{InterfaceRecord, InterfaceType, NodeRecord, SystemRecord};
#[cfg(test)]
use ssh_client::{CommandOutput, HostCredentials, RemoteExecutor, SshError};
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Mutex;

/// `ethtool enp1s0` on a gigabit copper port
#[cfg(test)]
pub const ETHTOOL_1G: &str = "Settings for enp1s0:
\tSupported ports: [ TP ]
\tSupported link modes:   10baseT/Half 10baseT/Full
\t                        100baseT/Half 100baseT/Full
\t                        1000baseT/Full
\tSupported pause frame use: Symmetric
\tSupports auto-negotiation: Yes
\tAdvertised link modes:  10baseT/Half 10baseT/Full
\t                        100baseT/Half 100baseT/Full
\t                        1000baseT/Full
\tSpeed: 1000Mb/s
\tDuplex: Full
\tAuto-negotiation: on
\tPort: Twisted Pair
\tPHYAD: 1
\tTransceiver: internal
\tMDI-X: off (auto)
\tSupports Wake-on: pumbg
\tWake-on: g
\tCurrent message level: 0x00000007 (7)
\t\t\t       drv probe link
\tLink detected: yes
";

/// `dmidecode -t system` on a Protectli box, which ships without a serial
#[cfg(test)]
pub const DMIDECODE_PROTECTLI: &str = "# dmidecode 3.4
Getting SMBIOS data from sysfs.
SMBIOS 3.2.0 present.

Handle 0x0001, DMI type 1, 27 bytes
System Information
\tManufacturer: Protectli
\tProduct Name: VP2420
\tVersion: Default string
\tSerial Number: Default string
\tUUID: 03000200-0400-0500-0006-000700080009
\tWake-up Type: Power Switch
\tSKU Number: Default string
\tFamily: Default string
";

/// `dmidecode -t system` on a server with a real serial
#[cfg(test)]
pub const DMIDECODE_SUPERMICRO: &str = "# dmidecode 3.3
Handle 0x0001, DMI type 1, 27 bytes
System Information
\tManufacturer: Supermicro
\tProduct Name: SYS-E300-9D
\tVersion: 0123456789
\tSerial Number: S123456X9A01234
\tUUID: 00000000-0000-0000-0000-ac1f6b000000
\tWake-up Type: Power Switch
";

/// SSH executor answering from a command -> output table
///
/// Unknown commands answer with `command not found` on stderr.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, CommandOutput>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `stdout` and an empty stderr
    pub fn respond(mut self, command: &str, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), CommandOutput::new(stdout, ""));
        self
    }

    /// Answer `command` with output on stderr
    pub fn respond_stderr(mut self, command: &str, stderr: &str) -> Self {
        self.responses
            .insert(command.to_string(), CommandOutput::new("", stderr));
        self
    }

    /// Fail `command` at the transport level
    pub fn fail(mut self, command: &str, message: &str) -> Self {
        self.failures.insert(command.to_string(), message.to_string());
        self
    }

    /// `(host, command)` pairs in the order they were executed
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn execute(&self, credentials: &HostCredentials, command: &str) -> Result<CommandOutput, SshError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((credentials.host.clone(), command.to_string()));
        }
        if let Some(message) = self.failures.get(command) {
            return Err(SshError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message.clone(),
            )));
        }
        Ok(self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutput::new("", format!("bash: {}: command not found", command))))
    }
}

/// A physical interface
#[cfg(test)]
pub fn physical_interface(mac: &str, label: &str, ipv4: Option<&str>) -> InterfaceRecord {
    InterfaceRecord {
        enabled: true,
        mac: mac.to_string(),
        interface_type: InterfaceType::Link(label.to_string()),
        duplex: Some("auto".to_string()),
        ipv4address: ipv4.map(str::to_string),
        ipv6address: None,
        bridge_ports: None,
    }
}

/// A bridge over `member`
#[cfg(test)]
pub fn bridge_interface(mac: &str, member: &str, ipv4: Option<&str>) -> InterfaceRecord {
    InterfaceRecord {
        enabled: true,
        mac: mac.to_string(),
        interface_type: InterfaceType::Bridge,
        duplex: None,
        ipv4address: ipv4.map(str::to_string),
        ipv6address: None,
        bridge_ports: Some(member.to_string()),
    }
}

/// A fully discovered node with one NIC and one bridge over it
#[cfg(test)]
pub fn create_test_node(name: &str, mac: &str, ip: &str) -> NodeRecord {
    let mut node = NodeRecord {
        name: name.to_string(),
        ip: Some(ip.to_string()),
        version: Some("8.2.4".to_string()),
        login_info: None,
        system: SystemRecord {
            manufacturer: Some("Protectli".to_string()),
            model: Some("VP2420".to_string()),
            serial: Some(mac.to_lowercase().replace(':', "-")),
            network_interfaces: Default::default(),
        },
    };
    node.system
        .network_interfaces
        .insert("enp1s0".to_string(), physical_interface(mac, "1gbase-t", None));
    node.system.network_interfaces.insert(
        "vmbr0".to_string(),
        bridge_interface(mac, "enp1s0", Some(&format!("{}/24", ip))),
    );
    node
}
