//! Parser for `key: value` diagnostic output (ethtool, dmidecode).
//!
//! Keys are normalised to lower case with whitespace and hyphens replaced by
//! underscores. Lines without a `:` continue the previous value. Values of keys
//! ending in `link_modes` are split into token lists.

use crate::error::ParseError;
use std::collections::BTreeMap;

/// A parsed value
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Parsed command output, keyed by normalised key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    fields: BTreeMap<String, FieldValue>,
}

impl ParsedBlock {
    /// Text value of a key; list values are not returned
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    /// Token list of a `*link_modes` key
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.fields.get(key)? {
            FieldValue::List(tokens) => Some(tokens),
            FieldValue::Text(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn from_raw(raw: Vec<(String, String)>) -> Self {
        let fields = raw
            .into_iter()
            .map(|(key, value)| {
                let value = if key.ends_with("link_modes") {
                    FieldValue::List(value.split_whitespace().map(str::to_string).collect())
                } else {
                    FieldValue::Text(value)
                };
                (key, value)
            })
            .collect();
        Self { fields }
    }
}

/// `Supported link-modes` -> `supported_link_modes`
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strict parse: a continuation line before any key is an error.
pub fn parse_key_values(text: &str) -> Result<ParsedBlock, ParseError> {
    let mut raw: Vec<(String, String)> = Vec::new();
    let mut current: Option<usize> = None;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => current = Some(store(&mut raw, normalize_key(key), value.trim())),
            None => {
                let slot = current.ok_or_else(|| ParseError::ContinuationBeforeKey {
                    line: index + 1,
                    text: line.trim().to_string(),
                })?;
                append(&mut raw[slot].1, &collapse_whitespace(line));
            }
        }
    }
    Ok(ParsedBlock::from_raw(raw))
}

/// Lenient parse for dumps with banners and section headers: lines without a
/// `:` are ignored instead of continuing the previous value.
pub fn parse_key_values_lenient(text: &str) -> ParsedBlock {
    let mut raw: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            store(&mut raw, normalize_key(key), value.trim());
        }
    }
    ParsedBlock::from_raw(raw)
}

/// Insert or overwrite a key; the last occurrence wins
fn store(raw: &mut Vec<(String, String)>, key: String, value: &str) -> usize {
    match raw.iter().position(|(existing, _)| *existing == key) {
        Some(slot) => {
            raw[slot].1 = value.to_string();
            slot
        }
        None => {
            raw.push((key, value.to_string()));
            raw.len() - 1
        }
    }
}

fn append(value: &mut String, continuation: &str) {
    if continuation.is_empty() {
        return;
    }
    if !value.is_empty() {
        value.push(' ');
    }
    value.push_str(continuation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_block() {
        let block = parse_key_values("manufacturer: Acme Corp\nserial number: 12345\n").unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.text("manufacturer"), Some("Acme Corp"));
        assert_eq!(block.text("serial_number"), Some("12345"));
    }

    #[test]
    fn test_continuation_lines_join_with_single_space() {
        let text = "Current message level: 0x00000007 (7)\n                       drv    probe   link\n";
        let block = parse_key_values(text).unwrap();
        assert_eq!(block.text("current_message_level"), Some("0x00000007 (7) drv probe link"));
    }

    #[test]
    fn test_link_modes_become_token_lists() {
        let text = "\tSupported link modes:   10baseT/Half 10baseT/Full\n\t                        1000baseT/Full\n";
        let block = parse_key_values(text).unwrap();
        assert_eq!(
            block.list("supported_link_modes"),
            Some(&["10baseT/Half".to_string(), "10baseT/Full".to_string(), "1000baseT/Full".to_string()][..])
        );
        assert_eq!(block.text("supported_link_modes"), None);
    }

    #[test]
    fn test_hyphens_and_values_with_colons() {
        let block = parse_key_values("Auto-negotiation: on\nPermanent address: aa:bb:cc:dd:ee:ff\n").unwrap();
        assert_eq!(block.text("auto_negotiation"), Some("on"));
        assert_eq!(block.text("permanent_address"), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_continuation_before_key_fails() {
        let result = parse_key_values("\n  orphan line\nkey: value\n");
        assert_eq!(
            result,
            Err(ParseError::ContinuationBeforeKey {
                line: 2,
                text: "orphan line".to_string()
            })
        );
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let block = parse_key_values("Port: MII\nPort: Twisted Pair\n").unwrap();
        assert_eq!(block.text("port"), Some("Twisted Pair"));
    }

    #[test]
    fn test_empty_value_then_continuation() {
        let block = parse_key_values("Advertised link modes:\n    1000baseT/Full\n").unwrap();
        assert_eq!(block.list("advertised_link_modes"), Some(&["1000baseT/Full".to_string()][..]));
    }

    #[test]
    fn test_lenient_parse_skips_headers() {
        let text = "# dmidecode 3.4\nHandle 0x0001, DMI type 1, 27 bytes\nSystem Information\n\tManufacturer: Protectli\n\tProduct Name: VP2420\n";
        let block = parse_key_values_lenient(text);
        assert_eq!(block.text("manufacturer"), Some("Protectli"));
        assert_eq!(block.text("product_name"), Some("VP2420"));
        assert_eq!(block.len(), 2);
    }
}
