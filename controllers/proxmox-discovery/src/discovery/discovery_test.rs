//! Unit tests for node discovery

#[cfg(test)]
mod tests {
    use crate::config::NodeCommands;
    use crate::credentials::LoginInfo;
    use crate::discovery::records::{InterfaceRecord, InterfaceType, SystemRecord};
    use crate::discovery::*;
    use crate::error::{ConfigurationError, DiscoveryError};
    use crate::test_utils::*;
    use proxmox_client::{ClusterNode, MockProxmoxClient, NetworkInterface};
    use ssh_client::Privilege;
    use std::collections::BTreeMap;

    const DMIDECODE: &str = "/usr/sbin/dmidecode -t system";

    fn root_login() -> LoginInfo {
        LoginInfo {
            login: Some("root".to_string()),
            ..Default::default()
        }
    }

    fn cluster_node(name: &str, ip: &str, online: bool) -> ClusterNode {
        ClusterNode {
            name: name.to_string(),
            ip: Some(ip.to_string()),
            online,
            version: Some("8.2.4".to_string()),
        }
    }

    fn nic(name: &str, active: bool) -> NetworkInterface {
        NetworkInterface {
            iface: name.to_string(),
            kind: Some("eth".to_string()),
            active,
            ..Default::default()
        }
    }

    fn bridge(name: &str, ports: &str, cidr: &str) -> NetworkInterface {
        NetworkInterface {
            iface: name.to_string(),
            kind: Some("bridge".to_string()),
            active: true,
            bridge_ports: Some(ports.to_string()),
            cidr: Some(cidr.to_string()),
            ..Default::default()
        }
    }

    fn mac_command(iface: &str) -> String {
        format!("/usr/bin/cat /sys/class/net/{}/address", iface)
    }

    fn protectli_executor() -> ScriptedExecutor {
        ScriptedExecutor::new()
            .respond(DMIDECODE, DMIDECODE_PROTECTLI)
            .respond(&mac_command("enp1s0"), "AA:BB:CC:DD:EE:FF\n")
            .respond(&mac_command("enp2s0"), "aa:bb:cc:dd:ee:01\n")
            .respond(&mac_command("vmbr0"), "AA:BB:CC:DD:EE:FF\n")
            .respond("/usr/sbin/ethtool enp1s0", ETHTOOL_1G)
    }

    fn protectli_cluster() -> MockProxmoxClient {
        MockProxmoxClient::new().with_network(
            "pve1",
            vec![
                bridge("vmbr0", "enp1s0", "10.0.0.11/24"),
                nic("enp2s0", false),
                nic("enp1s0", true),
            ],
        )
    }

    #[tokio::test]
    async fn test_protectli_serial_from_first_mac() {
        let executor = protectli_executor();
        let cluster = protectli_cluster();
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let node = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await
            .unwrap();

        assert_eq!(node.system.manufacturer.as_deref(), Some("Protectli"));
        assert_eq!(node.system.model.as_deref(), Some("VP2420"));
        assert_eq!(node.system.serial.as_deref(), Some("aa-bb-cc-dd-ee-ff"));
        assert_eq!(node.version.as_deref(), Some("8.2.4"));
        assert_eq!(node.ip.as_deref(), Some("10.0.0.11"));
    }

    #[tokio::test]
    async fn test_interfaces_are_classified() {
        let executor = protectli_executor();
        let cluster = protectli_cluster();
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let node = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await
            .unwrap();
        let interfaces = &node.system.network_interfaces;

        let names: Vec<_> = interfaces.keys().cloned().collect();
        assert_eq!(names, vec!["enp1s0", "enp2s0", "vmbr0"]);

        assert_eq!(interfaces["enp1s0"].interface_type, InterfaceType::Link("1gbase-t".to_string()));
        assert_eq!(interfaces["enp1s0"].duplex.as_deref(), Some("auto"));
        assert!(interfaces["enp1s0"].enabled);

        // inactive interfaces are not probed with ethtool
        assert_eq!(interfaces["enp2s0"].interface_type, InterfaceType::Other);
        assert!(!interfaces["enp2s0"].enabled);

        assert_eq!(interfaces["vmbr0"].interface_type, InterfaceType::Bridge);
        assert_eq!(interfaces["vmbr0"].bridge_ports.as_deref(), Some("enp1s0"));
        assert_eq!(interfaces["vmbr0"].ipv4address.as_deref(), Some("10.0.0.11/24"));

        let ethtool_calls = executor
            .calls()
            .into_iter()
            .filter(|(_, command)| command.starts_with("/usr/sbin/ethtool"))
            .count();
        assert_eq!(ethtool_calls, 1);
    }

    #[tokio::test]
    async fn test_real_serial_is_kept() {
        let executor = ScriptedExecutor::new()
            .respond(DMIDECODE, DMIDECODE_SUPERMICRO)
            .respond(&mac_command("eno1"), "ac:1f:6b:00:00:01\n")
            .respond("/usr/sbin/ethtool eno1", ETHTOOL_1G);
        let cluster = MockProxmoxClient::new().with_network("pve1", vec![nic("eno1", true)]);
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let node = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await
            .unwrap();
        assert_eq!(node.system.manufacturer.as_deref(), Some("Supermicro"));
        assert_eq!(node.system.serial.as_deref(), Some("S123456X9A01234"));
    }

    #[tokio::test]
    async fn test_stderr_is_fatal_for_the_node() {
        let executor = ScriptedExecutor::new()
            .respond(DMIDECODE, DMIDECODE_PROTECTLI)
            .respond_stderr(&mac_command("enp1s0"), "No such file or directory");
        let cluster = MockProxmoxClient::new().with_network("pve1", vec![nic("enp1s0", true)]);
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let result = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await;
        match result {
            Err(DiscoveryError::Command { node, command, .. }) => {
                assert_eq!(node, "pve1");
                assert_eq!(command, mac_command("enp1s0"));
            }
            other => panic!("expected a command error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_network_config_is_an_error() {
        let executor = ScriptedExecutor::new().respond(DMIDECODE, DMIDECODE_PROTECTLI);
        let cluster = MockProxmoxClient::new().with_network("pve1", vec![]);
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let result = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await;
        assert!(matches!(result, Err(DiscoveryError::Empty { what: "network configuration", .. })));
    }

    #[tokio::test]
    async fn test_discover_all_continues_past_failures() {
        let executor = protectli_executor();
        let cluster = MockProxmoxClient::new().with_network(
            "pve2",
            vec![bridge("vmbr0", "enp1s0", "10.0.0.12/24"), nic("enp1s0", true)],
        );
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let nodes = vec![
            cluster_node("pve0", "10.0.0.10", false),
            cluster_node("pve1", "10.0.0.11", true),
            cluster_node("pve2", "10.0.0.12", true),
        ];
        let mut logins = BTreeMap::new();
        logins.insert("pve2".to_string(), root_login());

        let results = discovery.discover_all(&nodes, &logins).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "pve1");
        assert!(matches!(
            results[0].1,
            Err(DiscoveryError::Configuration(ConfigurationError::MissingLoginField { field: "login", .. }))
        ));
        assert_eq!(results[1].0, "pve2");
        let pve2 = results[1].1.as_ref().unwrap();
        assert_eq!(pve2.system.network_interfaces.len(), 2);

        // the offline node was never contacted
        assert!(executor.calls().iter().all(|(host, _)| host == "10.0.0.12"));
    }

    #[tokio::test]
    async fn test_transport_failure_names_the_command() {
        let executor = protectli_executor().fail(DMIDECODE, "connection refused");
        let cluster = protectli_cluster();
        let commands = NodeCommands::default();
        let discovery = NodeDiscovery::new(&executor, &cluster, &commands, 22);

        let result = discovery
            .discover(&cluster_node("pve1", "10.0.0.11", true), &root_login())
            .await;
        match result {
            Err(DiscoveryError::Transport { node, command, .. }) => {
                assert_eq!(node, "pve1");
                assert_eq!(command, DMIDECODE);
            }
            other => panic!("expected a transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_password_is_a_configuration_error() {
        let login = LoginInfo {
            login: Some("root".to_string()),
            use_pass: true,
            ..Default::default()
        };
        assert_eq!(
            host_credentials("pve1", Some("10.0.0.11"), &login, 22),
            Err(ConfigurationError::MissingLoginField {
                node: "pve1".to_string(),
                field: "pass"
            })
        );
    }

    #[test]
    fn test_non_root_requires_sudo() {
        let mut login = LoginInfo {
            login: Some("ops".to_string()),
            ..Default::default()
        };
        assert_eq!(
            host_credentials("pve1", Some("10.0.0.11"), &login, 22),
            Err(ConfigurationError::SudoRequired {
                node: "pve1".to_string(),
                login: "ops".to_string()
            })
        );

        login.use_sudo = Some(true);
        login.sudo_pass = Some("hunter2".to_string());
        let credentials = host_credentials("pve1", Some("10.0.0.11"), &login, 2222).unwrap();
        assert_eq!(credentials.port, 2222);
        assert_eq!(
            credentials.privilege,
            Privilege::Sudo {
                password: Some("hunter2".to_string())
            }
        );
    }

    #[test]
    fn test_login_ip_overrides_node_ip() {
        let login = LoginInfo {
            ip: Some("192.168.1.5".to_string()),
            ..root_login()
        };
        let credentials = host_credentials("pve1", Some("10.0.0.11"), &login, 22).unwrap();
        assert_eq!(credentials.host, "192.168.1.5");
        assert_eq!(credentials.privilege, Privilege::Direct);

        assert!(matches!(
            host_credentials("pve1", None, &root_login(), 22),
            Err(ConfigurationError::MissingLoginField { field: "ip", .. })
        ));
    }

    #[test]
    fn test_serial_fallback_only_for_known_vendors() {
        let mut interfaces = BTreeMap::new();
        interfaces.insert("enp1s0".to_string(), physical_interface("AA:BB:CC:DD:EE:FF", "1gbase-t", None));

        let mut other_vendor = SystemRecord {
            manufacturer: Some("Dell Inc.".to_string()),
            network_interfaces: interfaces.clone(),
            ..Default::default()
        };
        apply_serial_fallback(&mut other_vendor);
        assert_eq!(other_vendor.serial, None);

        let mut appliance = SystemRecord {
            manufacturer: Some(" PROTECTLI ".to_string()),
            network_interfaces: interfaces,
            ..Default::default()
        };
        apply_serial_fallback(&mut appliance);
        assert_eq!(appliance.serial.as_deref(), Some("aa-bb-cc-dd-ee-ff"));
    }

    #[test]
    fn test_serial_fallback_skips_interfaces_without_mac() {
        let mut interfaces: BTreeMap<String, InterfaceRecord> = BTreeMap::new();
        interfaces.insert("bond0".to_string(), physical_interface("", "other", None));
        interfaces.insert("enp1s0".to_string(), physical_interface("00:E0:67:2A:11:01", "1gbase-t", None));
        let mut system = SystemRecord {
            manufacturer: Some("Protectli".to_string()),
            network_interfaces: interfaces,
            ..Default::default()
        };
        apply_serial_fallback(&mut system);
        assert_eq!(system.serial.as_deref(), Some("00-e0-67-2a-11-01"));
    }

    #[test]
    fn test_placeholder_serials() {
        assert!(is_placeholder_serial("Default string"));
        assert!(is_placeholder_serial("To Be Filled By O.E.M."));
        assert!(is_placeholder_serial("  "));
        assert!(!is_placeholder_serial("S123456X9A01234"));
    }
}
