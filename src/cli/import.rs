use crate::api::{ConfigFormat, ZabbixClient};
use crate::config::ZabbixConfig;
use crate::import::{import_source, read_source, ImportRules};
use crate::TemplateToolError;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "zabbix-template-importer";

#[derive(Parser, Debug)]
#[command(name = "zabbix-template-importer")]
#[command(about = "Import a Zabbix template file (XML or JSON)", long_about = None)]
pub struct ImportArgs {
    /// Set log level to DEBUG
    #[arg(short, long)]
    pub debug: bool,

    /// File to load (xml/json)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// The file is JSON instead of XML
    #[arg(short, long)]
    pub json: bool,

    /// JSON file with import rules applied per category over the built-in
    /// ones; a null category is not sent
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

impl ImportArgs {
    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::from_json_flag(self.json)
    }

    pub fn import_rules(&self) -> Result<ImportRules> {
        match &self.rules {
            Some(path) => ImportRules::from_file(path)
                .with_context(|| format!("Failed to load import rules from {}", path.display())),
            None => Ok(ImportRules::default()),
        }
    }
}

pub fn execute(args: &ImportArgs) -> Result<()> {
    let path = args.file.as_deref().ok_or(TemplateToolError::MissingInputFile)?;
    let source = read_source(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let rules = args.import_rules()?;

    let config = ZabbixConfig::from_env()?;
    let client = ZabbixClient::connect(&config)
        .with_context(|| format!("Failed to log in to Zabbix API at {}", config.url))?;

    import_source(&client, args.format(), &rules, &source)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    tracing::info!("Imported {}", path.display());
    Ok(())
}
