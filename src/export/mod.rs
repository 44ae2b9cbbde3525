// Exporter pipeline: list templates, export each one, optionally bundle them
pub mod archive;
pub mod document;

pub use document::EXPORT_DATE_SENTINEL;

use crate::api::{ConfigFormat, TemplateFilter, ZabbixApi};
use crate::{Result, TemplateToolError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Where loose files or the tarball end up.
    pub directory: PathBuf,
    pub filter: TemplateFilter,
    pub format: ConfigFormat,
    pub tarball: bool,
    pub reset_date: bool,
}

/// What an export run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Per-template files. In tarball mode these lived in the staging
    /// directory, which no longer exists.
    pub files: Vec<PathBuf>,
    pub tarball: Option<PathBuf>,
}

/// Turn a technical template name into a file stem. Folder-style names
/// (`Templates/Databases/MySQL`) would otherwise become directories.
pub fn sanitize_file_stem(host: &str) -> String {
    host.replace('/', "#")
}

/// Export every template matching `options.filter`.
///
/// Fails with [`TemplateToolError::NoTemplatesFound`] before touching the
/// filesystem when nothing matches.
pub fn export_templates(
    api: &dyn ZabbixApi,
    options: &ExportOptions,
    run_date: NaiveDate,
) -> Result<ExportSummary> {
    let templates = api.get_templates(&options.filter)?;
    if templates.is_empty() {
        return Err(TemplateToolError::NoTemplatesFound);
    }

    fs::create_dir_all(&options.directory)?;

    // Removed on drop, so error paths clean up too.
    let staging = if options.tarball {
        Some(TempDir::new()?)
    } else {
        None
    };
    let target_dir: &Path = staging
        .as_ref()
        .map(TempDir::path)
        .unwrap_or(options.directory.as_path());

    let mut files = Vec::with_capacity(templates.len());
    let mut written = HashSet::with_capacity(templates.len());
    for template in &templates {
        tracing::info!(
            "found template \"{}\" ({}) with id {}",
            template.name,
            template.host,
            template.templateid
        );

        let file_path = target_dir.join(format!(
            "{}.{}",
            sanitize_file_stem(&template.host),
            options.format.extension()
        ));

        let exported = api.export_configuration(options.format, &[template.templateid.clone()])?;
        let rendered = document::render(options.format, &exported, options.reset_date)?;
        fs::write(&file_path, rendered)?;

        tracing::debug!("Wrote {}", file_path.display());
        if written.insert(file_path.clone()) {
            files.push(file_path);
        } else {
            // "A/B" and "A#B" share a file; the later template wins
            tracing::warn!(
                "template \"{}\" overwrote {}, which another template was already exported to",
                template.host,
                file_path.display()
            );
        }
    }

    let tarball = match staging {
        Some(staging) => {
            tracing::info!("creating tarball in {}", options.directory.display());
            let tarball_path = options.directory.join(archive::tarball_name(run_date));
            archive::write_tarball(&tarball_path, &files)?;
            staging.close()?;
            Some(tarball_path)
        }
        None => None,
    };

    Ok(ExportSummary { files, tarball })
}
