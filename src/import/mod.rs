// Importer pipeline: read one template document and hand it to configuration.import
pub mod rules;

pub use rules::{ImportRule, ImportRules, DEFAULT_IMPORT_RULES};

use crate::api::{ConfigFormat, ZabbixApi};
use crate::Result;
use std::fs;
use std::path::Path;

/// Read the whole template document as text.
pub fn read_source(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)?;
    tracing::debug!("Read {} bytes from {}", source.len(), path.display());
    Ok(source)
}

/// Submit `source` as a single configuration import.
pub fn import_source(
    api: &dyn ZabbixApi,
    format: ConfigFormat,
    rules: &ImportRules,
    source: &str,
) -> Result<()> {
    tracing::info!("Importing {} template document ({} bytes)", format, source.len());
    api.import_configuration(format, rules, source)
}
