use crate::Result;
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the bundle produced on `run_date`.
pub fn tarball_name(run_date: NaiveDate) -> String {
    format!("templates_{}.tar.gz", run_date.format("%Y-%m-%d"))
}

/// Write `files` into a gzip-compressed tarball at `destination`.
///
/// Each file is stored under its bare file name, without any directory
/// component, in the order given.
pub fn write_tarball(destination: &Path, files: &[PathBuf]) -> Result<()> {
    let encoder = GzEncoder::new(File::create(destination)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for file in files {
        let entry_name = file.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Not a file path: {}", file.display()),
            )
        })?;
        builder.append_path_with_name(file, entry_name)?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_tarball_name_uses_run_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(tarball_name(date), "templates_2024-03-07.tar.gz");
    }

    #[test]
    fn test_entries_have_no_directory_prefix() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let first = source.path().join("Template OS Linux.xml");
        let second = source.path().join("Templates#Custom#App.xml");
        std::fs::write(&first, "<zabbix_export/>").unwrap();
        std::fs::write(&second, "<zabbix_export></zabbix_export>").unwrap();

        let tarball = output.path().join("bundle.tar.gz");
        write_tarball(&tarball, &[first, second]).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&tarball).unwrap()));
        let mut entries = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            entries.push((name, content));
        }

        assert_eq!(
            entries,
            vec![
                ("Template OS Linux.xml".to_string(), "<zabbix_export/>".to_string()),
                (
                    "Templates#Custom#App.xml".to_string(),
                    "<zabbix_export></zabbix_export>".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_missing_source_file_fails() {
        let output = TempDir::new().unwrap();
        let tarball = output.path().join("bundle.tar.gz");

        let result = write_tarball(&tarball, &[output.path().join("missing.xml")]);
        assert!(result.is_err());
    }
}
