//! Link classification from parsed ethtool output.
//!
//! The two tables below are shared with existing deployments and must keep
//! their exact contents.

use crate::discovery::parser::ParsedBlock;
use crate::discovery::records::InterfaceType;

/// `Supported ports` token -> port family
const PORT_FAMILIES: &[(&str, &str)] = &[("[ TP ]", "twisted pair")];

/// Port family -> link mode -> canonical label
const LINK_MODE_LABELS: &[(&str, &[(&str, &str)])] = &[(
    "twisted pair",
    &[("1000baseT", "1gbase-t"), ("2500baseT", "2.5gbase-t")],
)];

/// Result of classifying one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClassification {
    pub interface_type: InterfaceType,
    pub duplex: Option<String>,
}

/// Classify a parsed ethtool block. Unknown ports or link modes give `other`.
pub fn classify_link(block: &ParsedBlock) -> LinkClassification {
    // `Supported ports` wins over `Port` when both are reported
    let port = block.text("supported_ports").or_else(|| block.text("port"));
    let highest_mode = block
        .list("supported_link_modes")
        .and_then(|modes| modes.last())
        .map(String::as_str);

    let interface_type = match (port, highest_mode) {
        (Some(port), Some(mode)) => canonical_label(port, mode)
            .map(|label| InterfaceType::Link(label.to_string()))
            .unwrap_or(InterfaceType::Other),
        _ => InterfaceType::Other,
    };

    let duplex = if block.text("auto_negotiation") == Some("on") {
        Some("auto".to_string())
    } else {
        block.text("duplex").map(str::to_lowercase)
    };

    LinkClassification {
        interface_type,
        duplex,
    }
}

/// Two-level lookup: port token -> family, then `1000baseT/Full` -> `1000baseT` -> label
pub fn canonical_label(port: &str, link_mode: &str) -> Option<&'static str> {
    let family = PORT_FAMILIES
        .iter()
        .find(|(token, _)| *token == port)
        .map(|(_, family)| *family)?;
    let mode = link_mode.split('/').next().unwrap_or(link_mode);
    LINK_MODE_LABELS
        .iter()
        .find(|(name, _)| *name == family)
        .and_then(|(_, modes)| modes.iter().find(|(m, _)| *m == mode))
        .map(|(_, label)| *label)
}
