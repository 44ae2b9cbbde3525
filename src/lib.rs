//! Export and import Zabbix templates through the Zabbix JSON-RPC API.
//!
//! Two binaries sit on top of this library: `zabbix-template-exporter`
//! writes one file per template (optionally bundled into a tarball) and
//! `zabbix-template-importer` loads a template file back into a server.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;

pub use error::{Result, TemplateToolError};
