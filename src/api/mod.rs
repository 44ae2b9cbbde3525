// Zabbix API module - data types and the client seam used by both tools
pub mod client;

pub use client::{ApiVersion, HttpTransport, Transport, ZabbixClient};

use crate::import::ImportRules;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Template as returned by `template.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub templateid: String,
    /// Technical name.
    pub host: String,
    /// Visible name.
    pub name: String,
}

/// Template selection for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateFilter {
    All,
    Host(String),
    VisibleName(String),
}

impl TemplateFilter {
    /// Build the filter from the CLI options. A technical name wins over a visible name.
    pub fn from_names(name: Option<&str>, visible_name: Option<&str>) -> Self {
        match (name, visible_name) {
            (Some(host), _) => TemplateFilter::Host(host.to_string()),
            (None, Some(visible)) => TemplateFilter::VisibleName(visible.to_string()),
            (None, None) => TemplateFilter::All,
        }
    }
}

/// Document format for `configuration.export` and `configuration.import`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Xml,
    Json,
}

impl ConfigFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            ConfigFormat::Json
        } else {
            ConfigFormat::Xml
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Xml => "xml",
            ConfigFormat::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote calls the exporter and importer rely on.
pub trait ZabbixApi {
    /// List templates matching `filter`, in server order.
    fn get_templates(&self, filter: &TemplateFilter) -> Result<Vec<TemplateRef>>;

    /// Export the configuration of the given templates as one document.
    fn export_configuration(&self, format: ConfigFormat, template_ids: &[String]) -> Result<String>;

    /// Import `source` and reconcile it against the server using `rules`.
    fn import_configuration(
        &self,
        format: ConfigFormat,
        rules: &ImportRules,
        source: &str,
    ) -> Result<()>;
}
