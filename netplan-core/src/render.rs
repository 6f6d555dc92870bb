use std::fmt::{self, Display, Formatter};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::params::NetworkParams;

/// Netplan schema version written into every document.
pub const NETPLAN_VERSION: u8 = 2;

/// Destination of the default route attached to the static interface.
pub const DEFAULT_ROUTE: &str = "0.0.0.0/0";

/// Errors that can occur while serializing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize netplan document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A rendered netplan document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    text: String,
}

impl ConfigDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl Display for ConfigDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Serialize)]
struct NetplanDocument<'a> {
    network: Network<'a>,
}

#[derive(Debug, Serialize)]
struct Network<'a> {
    version: u8,
    renderer: &'a str,
    ethernets: Ethernets<'a>,
}

// Serialized as a mapping that keeps insertion order.
#[derive(Debug)]
struct Ethernets<'a>(Vec<(&'a str, Ethernet<'a>)>);

impl Serialize for Ethernets<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, ethernet) in &self.0 {
            map.serialize_entry(name, ethernet)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Ethernet<'a> {
    Dhcp {
        dhcp4: bool,
    },
    Static {
        addresses: Vec<&'a str>,
        routes: Vec<Route<'a>>,
        nameservers: Nameservers<'a>,
    },
}

#[derive(Debug, Serialize)]
struct Route<'a> {
    to: &'a str,
    via: &'a str,
}

#[derive(Debug, Serialize)]
struct Nameservers<'a> {
    addresses: Vec<&'a str>,
}

/// Render `params` into a netplan document for the given backend renderer.
///
/// The DHCP interface (if any) comes first, then the static interface with
/// its single address, a default route via the gateway, and the nameservers
/// in input order.
pub fn render(params: &NetworkParams, renderer: &str) -> Result<ConfigDocument, RenderError> {
    let mut ethernets = Vec::with_capacity(2);
    if let Some(dhcp) = params.dhcp_interface() {
        ethernets.push((dhcp, Ethernet::Dhcp { dhcp4: true }));
    }
    ethernets.push((
        params.static_interface(),
        Ethernet::Static {
            addresses: vec![params.address_cidr()],
            routes: vec![Route {
                to: DEFAULT_ROUTE,
                via: params.gateway(),
            }],
            nameservers: Nameservers {
                addresses: params.dns_servers().iter().map(String::as_str).collect(),
            },
        },
    ));

    let document = NetplanDocument {
        network: Network {
            version: NETPLAN_VERSION,
            renderer,
            ethernets: Ethernets(ethernets),
        },
    };

    Ok(ConfigDocument {
        text: serde_yaml::to_string(&document)?,
    })
}
