use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Operational state reported for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkState {
    Up,
    Down,
    Unknown,
}

impl LinkState {
    /// Map an `operstate` string (`UP`, `DOWN`, ...) onto a state.
    pub fn from_operstate(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            _ => Self::Unknown,
        }
    }
}

impl Display for LinkState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// One network interface as seen by the listing command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    /// Kernel interface name (`ens33`, `eth0`).
    pub name: String,
    /// Operational state.
    pub state: LinkState,
    /// Hardware address, absent for links without one.
    pub mac: Option<String>,
    /// First IPv4 address in `address/prefix` form.
    pub ipv4: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpLink {
    ifname: String,
    #[serde(default)]
    operstate: Option<String>,
    #[serde(default)]
    link_type: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    addr_info: Vec<IpAddrInfo>,
}

// `ip` emits `{}` placeholders inside addr_info for some links.
#[derive(Debug, Deserialize)]
struct IpAddrInfo {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    local: Option<String>,
    #[serde(default)]
    prefixlen: Option<u8>,
}

impl IpLink {
    fn into_info(self) -> Option<InterfaceInfo> {
        let link_type = self.link_type.as_deref().unwrap_or_default();
        if link_type == "loopback" {
            return None;
        }

        let mac = match link_type {
            "none" => None,
            _ => self.address.filter(|mac| !mac.is_empty()),
        };
        let ipv4 = self
            .addr_info
            .iter()
            .find(|info| info.family.as_deref() == Some("inet"))
            .and_then(|info| match (&info.local, info.prefixlen) {
                (Some(local), Some(len)) => Some(format!("{local}/{len}")),
                _ => None,
            });

        Some(InterfaceInfo {
            name: self.ifname,
            state: self
                .operstate
                .as_deref()
                .map(LinkState::from_operstate)
                .unwrap_or(LinkState::Unknown),
            mac,
            ipv4,
        })
    }
}

/// Parse the JSON array printed by `ip -json address show`.
///
/// Entries are decoded one at a time: an entry that does not decode is
/// skipped, and text that is not a JSON array yields an empty list.
/// Loopback links are never offered for configuration and are dropped.
pub fn parse_ip_json(text: &str) -> Vec<InterfaceInfo> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("interface listing is not a JSON array: {err}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<IpLink>(entry) {
            Ok(link) => link.into_info(),
            Err(err) => {
                tracing::debug!("skipping interface entry {idx}: {err}");
                None
            }
        })
        .collect()
}

/// Render a numbered selection table, one interface per line.
pub fn format_interface_table(interfaces: &[InterfaceInfo]) -> String {
    let name_width = interfaces
        .iter()
        .map(|iface| iface.name.len())
        .max()
        .unwrap_or(0);

    let mut out = Vec::with_capacity(interfaces.len());
    for (idx, iface) in interfaces.iter().enumerate() {
        out.push(format!(
            "[{}] {:<name_width$}  {:<7}  {:<17}  {}",
            idx + 1,
            iface.name,
            iface.state.to_string(),
            iface.mac.as_deref().unwrap_or("-"),
            iface.ipv4.as_deref().unwrap_or("-"),
        ));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{format_interface_table, parse_ip_json, InterfaceInfo, LinkState};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"[
        {"ifindex":1,"ifname":"lo","flags":["LOOPBACK","UP","LOWER_UP"],"mtu":65536,
         "operstate":"UNKNOWN","link_type":"loopback","address":"00:00:00:00:00:00",
         "addr_info":[{"family":"inet","local":"127.0.0.1","prefixlen":8,"scope":"host"}]},
        {"ifindex":2,"ifname":"ens33","flags":["BROADCAST","MULTICAST","UP","LOWER_UP"],
         "operstate":"UP","link_type":"ether","address":"00:0c:29:aa:bb:cc",
         "addr_info":[
            {"family":"inet6","local":"fe80::20c:29ff:feaa:bbcc","prefixlen":64},
            {"family":"inet","local":"192.168.1.50","prefixlen":24}]},
        {"ifindex":3,"ifname":"ens36","operstate":"DOWN","link_type":"ether",
         "address":"00:0c:29:dd:ee:ff","addr_info":[{}]},
        {"ifindex":4,"ifname":"tun0","operstate":"UNKNOWN","link_type":"none","addr_info":[]}
    ]"#;

    #[test]
    fn parses_links_and_skips_loopback() {
        let interfaces = parse_ip_json(SAMPLE);
        assert_eq!(
            interfaces,
            vec![
                InterfaceInfo {
                    name: "ens33".to_string(),
                    state: LinkState::Up,
                    mac: Some("00:0c:29:aa:bb:cc".to_string()),
                    ipv4: Some("192.168.1.50/24".to_string()),
                },
                InterfaceInfo {
                    name: "ens36".to_string(),
                    state: LinkState::Down,
                    mac: Some("00:0c:29:dd:ee:ff".to_string()),
                    ipv4: None,
                },
                InterfaceInfo {
                    name: "tun0".to_string(),
                    state: LinkState::Unknown,
                    mac: None,
                    ipv4: None,
                },
            ]
        );
    }

    #[test]
    fn skips_entries_that_do_not_decode() {
        let text = r#"[{"ifindex":7},{"ifname":42},{"ifname":"eth0","operstate":"up"}]"#;
        let interfaces = parse_ip_json(text);
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].name, "eth0");
        assert_eq!(interfaces[0].state, LinkState::Up);
    }

    #[test]
    fn garbage_yields_empty_list() {
        assert!(parse_ip_json("").is_empty());
        assert!(parse_ip_json("1: lo: <LOOPBACK,UP> mtu 65536").is_empty());
        assert!(parse_ip_json("{\"ifname\":\"eth0\"}").is_empty());
    }

    #[test]
    fn table_numbers_from_one_and_marks_missing_fields() {
        let table = format_interface_table(&parse_ip_json(SAMPLE));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[1] ens33"));
        assert!(lines[0].ends_with("192.168.1.50/24"));
        assert!(lines[1].starts_with("[2] ens36"));
        assert!(lines[1].ends_with('-'));
        assert!(lines[2].contains("UNKNOWN"));
    }

    #[test]
    fn empty_table_is_empty() {
        assert_eq!(format_interface_table(&[]), "");
    }
}
