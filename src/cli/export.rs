use crate::api::{ConfigFormat, TemplateFilter, ZabbixClient};
use crate::config::ZabbixConfig;
use crate::export::{export_templates, ExportOptions, ExportSummary};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "zabbix-template-exporter";

#[derive(Parser, Debug)]
#[command(name = "zabbix-template-exporter")]
#[command(
    about = "Export Zabbix templates either to one tar.gz or to individual files",
    long_about = None
)]
pub struct ExportArgs {
    /// Set log level to DEBUG
    #[arg(short, long)]
    pub debug: bool,

    /// Directory to dump template files to
    #[arg(short = 'D', long, default_value = ".")]
    pub directory: PathBuf,

    /// Technical name of template to export
    #[arg(short, long)]
    pub name: Option<String>,

    /// Visible name of the template to export (ignored when --name is given)
    #[arg(short, long)]
    pub visible_name: Option<String>,

    /// Create tarball of all exported templates in given directory
    #[arg(short, long)]
    pub tarball: bool,

    /// Reset export date to 2000-01-01T00:00:00Z
    #[arg(short, long)]
    pub reset_date: bool,

    /// Export JSON instead of XML
    #[arg(short, long)]
    pub json: bool,
}

impl ExportArgs {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            directory: self.directory.clone(),
            filter: TemplateFilter::from_names(self.name.as_deref(), self.visible_name.as_deref()),
            format: ConfigFormat::from_json_flag(self.json),
            tarball: self.tarball,
            reset_date: self.reset_date,
        }
    }
}

pub fn execute(args: &ExportArgs) -> Result<ExportSummary> {
    let options = args.options();
    tracing::debug!("Export options: {:?}", options);

    let config = ZabbixConfig::from_env()?;
    let client = ZabbixClient::connect(&config)
        .with_context(|| format!("Failed to log in to Zabbix API at {}", config.url))?;

    let run_date = chrono::Local::now().date_naive();
    let summary = export_templates(&client, &options, run_date)?;

    match &summary.tarball {
        Some(tarball) => tracing::info!(
            "Exported {} templates into {}",
            summary.files.len(),
            tarball.display()
        ),
        None => tracing::info!(
            "Exported {} templates to {}",
            summary.files.len(),
            options.directory.display()
        ),
    }

    Ok(summary)
}
