//! Static/DHCP netplan configuration generator.
//!
//! The library half of the `netplan-ip` tool. It gathers network parameters
//! from flags or an interactive prompt, renders them with `netplan-core`,
//! and runs the backup, write and apply sequence against a netplan
//! directory.
//!
//! # Architecture
//!
//! - [`settings`] — Paths and commands, from built-in defaults and an optional TOML file
//! - [`system`] — Subprocess adapters for listing interfaces and applying configs
//! - [`collect`] — Mode selection and parameter collection (flags or prompts)
//! - [`prompt`] — Line-oriented prompter over any reader/writer pair
//! - [`pipeline`] — Backup → write → apply, with progress events
//! - [`report`] — Colored terminal lines for progress and hints
//!
//! # Workflow
//!
//! 1. **Enumerate** interfaces via [`system::InterfaceLister`]
//! 2. **Collect** and validate [`netplan_core::NetworkParams`]
//! 3. **Render** the netplan document
//! 4. **Execute** the pipeline; the apply exit code becomes the process exit code
//!
//! External commands sit behind the [`system::InterfaceLister`] and
//! [`system::ConfigApplier`] traits so tests can substitute fakes.

pub mod collect;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod settings;
pub mod system;
