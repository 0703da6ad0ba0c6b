use super::load_config;
use crate::cli::args::{OutputFormat, VerifyArgs};
use crate::exit_codes::{BUILD_FAILED, SUCCESS};
use archivist_core::{verify_manifest, EntryStatus};
use std::path::{Path, PathBuf};

pub fn run(config_path: &Path, args: VerifyArgs) -> anyhow::Result<i32> {
    let manifest = match args.manifest {
        Some(path) => path,
        None => load_config(config_path)?.manifest_path(),
    };
    let archive_dir = args.archive_dir.unwrap_or_else(|| {
        manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let report = verify_manifest(&manifest, &archive_dir)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for check in report.failures() {
                let detail = match &check.status {
                    EntryStatus::Ok => continue,
                    EntryStatus::Missing => "archive missing".to_string(),
                    EntryStatus::SizeMismatch { expected, actual } => {
                        format!("size {} != recorded {}", actual, expected)
                    }
                    EntryStatus::HashMismatch { expected, actual } => {
                        format!("sha256 {} != recorded {}", actual, expected)
                    }
                };
                eprintln!("error: [{}] {}: {}", check.section, check.file, detail);
            }
        }
    }

    if report.is_ok() {
        eprintln!(
            "verify: OK ({} archive(s), {})",
            report.checks.len(),
            manifest.display()
        );
        Ok(SUCCESS)
    } else {
        eprintln!(
            "verify: FAILED ({} of {} archive(s))",
            report.failures().count(),
            report.checks.len()
        );
        Ok(BUILD_FAILED)
    }
}
