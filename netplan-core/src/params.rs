use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use ipnet::Ipv4Net;
use thiserror::Error;

/// Longest interface name the kernel accepts (IFNAMSIZ minus the NUL).
pub const MAX_INTERFACE_NAME: usize = 15;

/// Rejected or missing user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value was not supplied.
    #[error("missing required value: {0}")]
    Missing(&'static str),
    /// A value was supplied but is not syntactically valid.
    #[error("invalid {field} '{value}': {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// The same interface was picked for DHCP and static addressing.
    #[error("interface {0} cannot be both the DHCP and the static interface")]
    SameInterface(String),
    /// Interactive input ended before all values were collected.
    #[error("input aborted")]
    Aborted,
}

impl ValidationError {
    fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Unvalidated parameters as gathered from flags or prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub dhcp_interface: Option<String>,
    pub static_interface: Option<String>,
    pub address_cidr: Option<String>,
    pub gateway: Option<String>,
    /// Each entry may itself hold several comma or space separated servers.
    pub dns_servers: Vec<String>,
    pub output_path: PathBuf,
    pub backup_enabled: bool,
    pub apply_enabled: bool,
}

/// Validated parameters for one run. Only obtainable through [`NetworkParams::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    dhcp_interface: Option<String>,
    static_interface: String,
    address_cidr: String,
    gateway: String,
    dns_servers: Vec<String>,
    output_path: PathBuf,
    backup_enabled: bool,
    apply_enabled: bool,
}

impl NetworkParams {
    /// Check every field of `raw` and build the immutable parameter set.
    ///
    /// Fields are checked in a fixed order (interfaces, address, gateway,
    /// DNS) and the first failure is returned.
    pub fn validate(raw: RawParams) -> Result<Self, ValidationError> {
        let dhcp_interface = match raw.dhcp_interface.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(check_interface_name("dhcp interface", name)?),
        };

        let static_interface = raw
            .static_interface
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::Missing("static interface"))?;
        let static_interface = check_interface_name("static interface", static_interface)?;

        if dhcp_interface.as_deref() == Some(static_interface.as_str()) {
            return Err(ValidationError::SameInterface(static_interface));
        }

        let address_raw =
            non_empty(raw.address_cidr.as_deref()).ok_or(ValidationError::Missing("address"))?;
        let network = check_address_cidr(address_raw)?;

        let gateway_raw =
            non_empty(raw.gateway.as_deref()).ok_or(ValidationError::Missing("gateway"))?;
        let gateway = check_gateway(gateway_raw)?;
        if !network.contains(&gateway) {
            tracing::warn!(
                "gateway {gateway} is outside the static subnet {}",
                network.trunc()
            );
        }

        let dns_servers: Vec<String> = raw
            .dns_servers
            .iter()
            .flat_map(|entry| split_dns_list(entry))
            .collect();
        if dns_servers.is_empty() {
            return Err(ValidationError::Missing("dns servers"));
        }
        for server in &dns_servers {
            check_dns_server(server)?;
        }

        Ok(Self {
            dhcp_interface,
            static_interface,
            address_cidr: network.to_string(),
            gateway: gateway.to_string(),
            dns_servers,
            output_path: raw.output_path,
            backup_enabled: raw.backup_enabled,
            apply_enabled: raw.apply_enabled,
        })
    }

    pub fn dhcp_interface(&self) -> Option<&str> {
        self.dhcp_interface.as_deref()
    }

    pub fn static_interface(&self) -> &str {
        &self.static_interface
    }

    pub fn address_cidr(&self) -> &str {
        &self.address_cidr
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    pub fn dns_servers(&self) -> &[String] {
        &self.dns_servers
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn backup_enabled(&self) -> bool {
        self.backup_enabled
    }

    pub fn apply_enabled(&self) -> bool {
        self.apply_enabled
    }

    /// Interfaces the rendered document will define, DHCP first.
    pub fn interface_names(&self) -> Vec<&str> {
        self.dhcp_interface
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.static_interface.as_str()))
            .collect()
    }

    /// Copy of these parameters with the apply step switched on.
    pub fn with_apply(mut self) -> Self {
        self.apply_enabled = true;
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check an interface name the way the kernel would accept it.
pub fn check_interface_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if name.len() > MAX_INTERFACE_NAME {
        return Err(ValidationError::invalid(
            field,
            name,
            format!("longer than {MAX_INTERFACE_NAME} characters"),
        ));
    }
    if name == "." || name == ".." {
        return Err(ValidationError::invalid(field, name, "reserved name"));
    }
    if let Some(bad) = name.chars().find(|&c| {
        c.is_whitespace() || c.is_control() || matches!(c, '/' | ':' | '#' | '"' | '\'')
    }) {
        return Err(ValidationError::invalid(
            field,
            name,
            format!("contains forbidden character {bad:?}"),
        ));
    }
    Ok(name.to_string())
}

/// Parse an IPv4 `address/prefix` pair. Host bits are kept.
pub fn check_address_cidr(value: &str) -> Result<Ipv4Net, ValidationError> {
    let value = value.trim();
    if !value.contains('/') {
        return Err(ValidationError::invalid(
            "address",
            value,
            "expected address/prefix, e.g. 192.168.1.50/24",
        ));
    }
    value
        .parse::<Ipv4Net>()
        .map_err(|err| ValidationError::invalid("address", value, err.to_string()))
}

/// Parse a gateway, which must be a plain IPv4 address.
pub fn check_gateway(value: &str) -> Result<Ipv4Addr, ValidationError> {
    let value = value.trim();
    value
        .parse::<Ipv4Addr>()
        .map_err(|err| ValidationError::invalid("gateway", value, err.to_string()))
}

/// Parse one nameserver address (IPv4 or IPv6).
pub fn check_dns_server(value: &str) -> Result<IpAddr, ValidationError> {
    let value = value.trim();
    value
        .parse::<IpAddr>()
        .map_err(|err| ValidationError::invalid("dns server", value, err.to_string()))
}

/// Split a comma and/or whitespace separated server list, dropping blanks.
pub fn split_dns_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        check_address_cidr, check_interface_name, split_dns_list, NetworkParams, RawParams,
        ValidationError,
    };
    use pretty_assertions::assert_eq;

    fn raw() -> RawParams {
        RawParams {
            dhcp_interface: Some("ens33".to_string()),
            static_interface: Some("ens36".to_string()),
            address_cidr: Some("10.0.0.5/24".to_string()),
            gateway: Some("10.0.0.1".to_string()),
            dns_servers: vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()],
            output_path: "/tmp/netplan/01-test.yaml".into(),
            backup_enabled: true,
            apply_enabled: false,
        }
    }

    #[test]
    fn accepts_complete_input() {
        let params = NetworkParams::validate(raw()).expect("valid params");
        assert_eq!(params.dhcp_interface(), Some("ens33"));
        assert_eq!(params.static_interface(), "ens36");
        assert_eq!(params.address_cidr(), "10.0.0.5/24");
        assert_eq!(params.gateway(), "10.0.0.1");
        assert_eq!(params.dns_servers(), ["8.8.8.8", "1.1.1.1"]);
        assert_eq!(params.interface_names(), vec!["ens33", "ens36"]);
        assert!(params.backup_enabled());
        assert!(!params.apply_enabled());
        assert!(params.with_apply().apply_enabled());
    }

    #[test]
    fn rejects_same_dhcp_and_static_interface() {
        let mut input = raw();
        input.dhcp_interface = Some("ens36".to_string());
        assert_eq!(
            NetworkParams::validate(input),
            Err(ValidationError::SameInterface("ens36".to_string()))
        );
    }

    #[test]
    fn blank_dhcp_interface_means_none() {
        let mut input = raw();
        input.dhcp_interface = Some("  ".to_string());
        let params = NetworkParams::validate(input).expect("valid params");
        assert_eq!(params.dhcp_interface(), None);
        assert_eq!(params.interface_names(), vec!["ens36"]);
    }

    #[test]
    fn rejects_addresses_without_prefix() {
        for address in ["10.0.0.5", "192.168.1.50", "10.0.0.5/", "10.0.0.5/33", "fe80::1/64"] {
            let mut input = raw();
            input.address_cidr = Some(address.to_string());
            let err = NetworkParams::validate(input).expect_err(address);
            assert!(
                matches!(err, ValidationError::Invalid { field: "address", .. }),
                "{address}: {err}"
            );
        }
    }

    #[test]
    fn reports_first_missing_field() {
        let mut input = raw();
        input.gateway = None;
        assert_eq!(
            NetworkParams::validate(input),
            Err(ValidationError::Missing("gateway"))
        );

        let mut input = raw();
        input.static_interface = None;
        input.gateway = None;
        assert_eq!(
            NetworkParams::validate(input),
            Err(ValidationError::Missing("static interface"))
        );

        let mut input = raw();
        input.dns_servers = vec![" , ".to_string()];
        assert_eq!(
            NetworkParams::validate(input),
            Err(ValidationError::Missing("dns servers"))
        );
    }

    #[test]
    fn rejects_bad_gateway_and_dns() {
        let mut input = raw();
        input.gateway = Some("10.0.0.256".to_string());
        assert!(matches!(
            NetworkParams::validate(input),
            Err(ValidationError::Invalid { field: "gateway", .. })
        ));

        let mut input = raw();
        input.gateway = Some("10.0.0.1/24".to_string());
        assert!(NetworkParams::validate(input).is_err());

        let mut input = raw();
        input.dns_servers = vec!["8.8.8.8".to_string(), "dns.google".to_string()];
        assert!(matches!(
            NetworkParams::validate(input),
            Err(ValidationError::Invalid { field: "dns server", .. })
        ));
    }

    #[test]
    fn dns_entries_are_flattened_in_order() {
        let mut input = raw();
        input.dns_servers = vec![
            "9.9.9.9, 8.8.8.8".to_string(),
            "2606:4700:4700::1111".to_string(),
            "1.1.1.1".to_string(),
        ];
        let params = NetworkParams::validate(input).expect("valid params");
        assert_eq!(
            params.dns_servers(),
            ["9.9.9.9", "8.8.8.8", "2606:4700:4700::1111", "1.1.1.1"]
        );
    }

    #[test]
    fn interface_names_follow_kernel_rules() {
        assert_eq!(check_interface_name("iface", " eth0 "), Ok("eth0".to_string()));
        assert!(check_interface_name("iface", "enp0s31f6.100").is_ok());
        assert!(check_interface_name("iface", "averyveryverylongname").is_err());
        assert!(check_interface_name("iface", "eth 0").is_err());
        assert!(check_interface_name("iface", "eth0:1").is_err());
        assert!(check_interface_name("iface", "..").is_err());
        assert_eq!(
            check_interface_name("iface", ""),
            Err(ValidationError::Missing("iface"))
        );
    }

    #[test]
    fn cidr_keeps_host_bits() {
        let net = check_address_cidr("192.168.1.50/24").expect("cidr");
        assert_eq!(net.to_string(), "192.168.1.50/24");
        assert_eq!(net.prefix_len(), 24);
    }

    #[test]
    fn splits_dns_on_commas_and_spaces() {
        assert_eq!(
            split_dns_list("8.8.8.8,1.1.1.1  9.9.9.9 ,"),
            vec!["8.8.8.8", "1.1.1.1", "9.9.9.9"]
        );
        assert!(split_dns_list("   ").is_empty());
    }
}
