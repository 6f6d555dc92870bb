use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use netplan_ip::collect::FlagValues;

#[derive(Parser, Debug)]
#[command(name = "netplan-ip")]
#[command(about = "Write a static (and optional DHCP) netplan configuration")]
#[command(
    after_help = "Without --interface/--address/--gateway/--dns the values are asked for interactively."
)]
pub struct Cli {
    /// Interface to configure statically (e.g. ens33, eth0).
    #[arg(short, long = "interface", visible_alias = "static-interface")]
    pub interface: Option<String>,
    /// Interface to configure with DHCP (must differ from the static one).
    #[arg(long)]
    pub dhcp_interface: Option<String>,
    /// IPv4 address with prefix length (e.g. 192.168.1.50/24).
    #[arg(short, long)]
    pub address: Option<String>,
    /// Default gateway (e.g. 192.168.1.1).
    #[arg(short, long)]
    pub gateway: Option<String>,
    /// DNS servers, space or comma separated (e.g. 8.8.8.8 1.1.1.1).
    #[arg(short, long, num_args = 1..)]
    pub dns: Vec<String>,
    /// Netplan configuration directory.
    #[arg(long)]
    pub netplan_dir: Option<PathBuf>,
    /// File name (or path) to write inside the netplan directory.
    ///
    /// An absolute path is written as given, but backups and overlap checks
    /// only cover the netplan directory (see --netplan-dir).
    #[arg(long)]
    pub output: Option<String>,
    /// Apply the configuration right after writing it.
    #[arg(long)]
    pub apply: bool,
    /// Do not back up existing netplan files.
    #[arg(long)]
    pub no_backup: bool,
    /// Settings file (TOML) overriding built-in paths and commands.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Validate and print the document without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
    /// Print the detected interfaces and exit.
    #[arg(long, conflicts_with_all = ["apply", "dry_run"])]
    pub list: bool,
    /// Output format for --list.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn flag_values(&self) -> FlagValues {
        FlagValues {
            static_interface: self.interface.clone(),
            dhcp_interface: self.dhcp_interface.clone(),
            address: self.address.clone(),
            gateway: self.gateway.clone(),
            dns: self.dns.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
