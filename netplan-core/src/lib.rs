//! Interface discovery, parameter validation and netplan rendering primitives
//! used by higher-level tools.

pub mod backup;
pub mod interfaces;
pub mod overlap;
pub mod params;
pub mod render;
pub mod writer;

pub use backup::{
    backup_configs, backup_stamp, current_stamp, BackupError, BackupSet, SkippedFile,
};
pub use interfaces::{format_interface_table, parse_ip_json, InterfaceInfo, LinkState};
pub use overlap::{find_overlaps, Overlap};
pub use params::{NetworkParams, RawParams, ValidationError};
pub use render::{render, ConfigDocument, RenderError};
pub use writer::{write_document, WriteError};
