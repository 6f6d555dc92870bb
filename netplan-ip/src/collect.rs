//! Turning command line flags or interactive answers into [`NetworkParams`].

use std::io::{BufRead, Write};
use std::path::PathBuf;

use netplan_core::params::{
    check_address_cidr, check_dns_server, check_gateway, check_interface_name, split_dns_list,
};
use netplan_core::{
    format_interface_table, InterfaceInfo, NetworkParams, RawParams, ValidationError,
};

use crate::prompt::{PromptError, Prompter};

/// Answers meaning "no DHCP interface".
const NO_DHCP_ANSWERS: [&str; 3] = ["", "none", "n"];

/// Network values given as flags. All absent means interactive mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValues {
    pub static_interface: Option<String>,
    pub dhcp_interface: Option<String>,
    pub address: Option<String>,
    pub gateway: Option<String>,
    pub dns: Vec<String>,
}

impl FlagValues {
    fn has_required(&self) -> bool {
        self.static_interface.is_some()
            || self.address.is_some()
            || self.gateway.is_some()
            || !self.dns.is_empty()
    }
}

/// How parameters are collected for this run, decided once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for everything not given; `dhcp_interface` may be preset.
    Interactive { dhcp_interface: Option<String> },
    /// Take everything from flags; anything missing is an error.
    NonInteractive(FlagValues),
}

impl Mode {
    /// Interactive unless at least one of the required network flags is set.
    pub fn select(flags: FlagValues) -> Self {
        if flags.has_required() {
            Self::NonInteractive(flags)
        } else {
            Self::Interactive {
                dhcp_interface: flags.dhcp_interface,
            }
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive { .. })
    }
}

/// Run-level choices that do not come from the network questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub output_path: PathBuf,
    pub backup_enabled: bool,
    pub apply_enabled: bool,
}

/// Validate flag values into parameters.
pub fn from_flags(
    flags: FlagValues,
    opts: &RunOptions,
) -> Result<NetworkParams, ValidationError> {
    NetworkParams::validate(RawParams {
        dhcp_interface: flags.dhcp_interface,
        static_interface: flags.static_interface,
        address_cidr: flags.address,
        gateway: flags.gateway,
        dns_servers: flags.dns,
        output_path: opts.output_path.clone(),
        backup_enabled: opts.backup_enabled,
        apply_enabled: opts.apply_enabled,
    })
}

/// Walk the user through interface selection and addressing.
pub fn interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    interfaces: &[InterfaceInfo],
    preset_dhcp: Option<String>,
    opts: &RunOptions,
) -> Result<NetworkParams, PromptError> {
    prompter.say("=== netplan-ip interactive mode (q to quit) ===")?;
    if interfaces.is_empty() {
        prompter.say("[*] No interfaces detected; enter interface names directly.")?;
    }

    let dhcp_interface = match preset_dhcp {
        Some(name) => Some(check_interface_name("dhcp interface", &name)?),
        None => {
            show_table(prompter, interfaces)?;
            prompter.ask_until(
                "DHCP interface (number or name, empty for none): ",
                |answer| {
                    if NO_DHCP_ANSWERS.contains(&answer.to_ascii_lowercase().as_str()) {
                        return Ok(None);
                    }
                    pick_interface("dhcp interface", answer, interfaces).map(Some)
                },
            )?
        }
    };

    show_table(prompter, interfaces)?;
    let static_interface = prompter.ask_until("Static interface (number or name): ", |answer| {
        let name = pick_interface("static interface", answer, interfaces)?;
        if dhcp_interface.as_deref() == Some(name.as_str()) {
            return Err(ValidationError::SameInterface(name));
        }
        Ok(name)
    })?;

    let address = prompter.ask_until(
        "IPv4 address with prefix (e.g. 192.168.1.50/24): ",
        |answer| check_address_cidr(answer).map(|_| answer.to_string()),
    )?;
    let gateway = prompter.ask_until("Gateway (e.g. 192.168.1.1): ", |answer| {
        check_gateway(answer).map(|_| answer.to_string())
    })?;
    let dns = prompter.ask_until(
        "DNS servers (comma or space separated, e.g. 8.8.8.8,1.1.1.1): ",
        |answer| {
            let servers = split_dns_list(answer);
            if servers.is_empty() {
                return Err(ValidationError::Missing("dns servers"));
            }
            for server in &servers {
                check_dns_server(server)?;
            }
            Ok(servers)
        },
    )?;

    let params = NetworkParams::validate(RawParams {
        dhcp_interface,
        static_interface: Some(static_interface),
        address_cidr: Some(address),
        gateway: Some(gateway),
        dns_servers: dns,
        output_path: opts.output_path.clone(),
        backup_enabled: opts.backup_enabled,
        apply_enabled: opts.apply_enabled,
    })?;
    Ok(params)
}

fn show_table<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    interfaces: &[InterfaceInfo],
) -> Result<(), PromptError> {
    if !interfaces.is_empty() {
        prompter.say(&format_interface_table(interfaces))?;
    }
    Ok(())
}

/// Resolve a 1-based index into the table, or take the answer as a name.
fn pick_interface(
    field: &'static str,
    answer: &str,
    interfaces: &[InterfaceInfo],
) -> Result<String, ValidationError> {
    if let Ok(index) = answer.parse::<usize>() {
        return match index.checked_sub(1).and_then(|idx| interfaces.get(idx)) {
            Some(iface) => Ok(iface.name.clone()),
            None if interfaces.is_empty() => Err(ValidationError::Invalid {
                field,
                value: answer.to_string(),
                reason: "no interfaces were detected, type a name".to_string(),
            }),
            None => Err(ValidationError::Invalid {
                field,
                value: answer.to_string(),
                reason: format!("choose a number between 1 and {}", interfaces.len()),
            }),
        };
    }
    check_interface_name(field, answer)
}
