use serde::{Deserialize, Serialize};

/// Identity of the primary Ethernet interface, as discovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub ipv4: Option<String>,
    pub mac: Option<String>,
}

impl InterfaceDescriptor {
    /// MAC with separators stripped and uppercased, e.g. `001122AABBCC`.
    pub fn normalized_mac(&self) -> Option<String> {
        self.mac.as_deref().map(normalize_mac)
    }
}

pub fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_mac() {
        let desc = InterfaceDescriptor {
            name: "em0".to_string(),
            ipv4: Some("10.0.0.5".to_string()),
            mac: Some("00:0d:3a:1b:2c:ff".to_string()),
        };
        assert_eq!(desc.normalized_mac().as_deref(), Some("000D3A1B2CFF"));
    }

    #[test]
    fn test_normalized_mac_absent() {
        let desc = InterfaceDescriptor {
            name: "em0".to_string(),
            ipv4: None,
            mac: None,
        };
        assert!(desc.normalized_mac().is_none());
    }
}
