//! Check built archives against a written manifest.

use crate::error::BuildResult;
use crate::integrity;
use crate::manifest::read_manifest;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Ok,
    Missing,
    SizeMismatch { expected: u64, actual: u64 },
    HashMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryCheck {
    pub section: &'static str,
    pub file: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub checks: Vec<EntryCheck>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.status == EntryStatus::Ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryCheck> {
        self.checks.iter().filter(|c| c.status != EntryStatus::Ok)
    }
}

/// Recompute size and hash of every archive listed in the manifest.
///
/// Missing or mismatching archives are reported, not raised; only an
/// unreadable manifest or an unreadable (but present) archive is an error.
pub fn verify_manifest(manifest_path: &Path, archive_dir: &Path) -> BuildResult<VerifyReport> {
    let manifest = read_manifest(manifest_path)?;
    let mut report = VerifyReport::default();

    for (section, entry) in manifest.iter() {
        let path = archive_dir.join(&entry.file);
        let status = if !path.is_file() {
            EntryStatus::Missing
        } else {
            let actual = integrity::record(&path)?;
            if actual.size != entry.size {
                EntryStatus::SizeMismatch {
                    expected: entry.size,
                    actual: actual.size,
                }
            } else if !actual.sha256.eq_ignore_ascii_case(&entry.hash) {
                EntryStatus::HashMismatch {
                    expected: entry.hash.clone(),
                    actual: actual.sha256,
                }
            } else {
                EntryStatus::Ok
            }
        };
        report.checks.push(EntryCheck {
            section: section.key(),
            file: entry.file.clone(),
            status,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{write_manifest, Manifest, ManifestEntry, ManifestSection};
    use std::fs;

    fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("A.zip");
        fs::write(&archive, b"archive bytes").unwrap();
        let integrity = integrity::record(&archive).unwrap();

        let mut manifest = Manifest::new();
        manifest.record(
            ManifestSection::Platforms,
            ManifestEntry {
                name: "A".into(),
                file: "A.zip".into(),
                path: None,
                size: integrity.size,
                uncompressed_size: 0,
                hash: integrity.sha256,
            },
        );
        let manifest_path = dir.path().join("info.json");
        write_manifest(&manifest, &manifest_path).unwrap();
        (dir, manifest_path)
    }

    #[test]
    fn untouched_archives_verify() {
        let (dir, manifest_path) = setup();
        let report = verify_manifest(&manifest_path, dir.path()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.checks[0].section, "platforms");
    }

    #[test]
    fn tampering_is_detected() {
        let (dir, manifest_path) = setup();
        fs::write(dir.path().join("A.zip"), b"archive bytez").unwrap();
        let report = verify_manifest(&manifest_path, dir.path()).unwrap();
        assert!(!report.is_ok());
        assert!(matches!(
            report.checks[0].status,
            EntryStatus::HashMismatch { .. }
        ));

        fs::write(dir.path().join("A.zip"), b"short").unwrap();
        let report = verify_manifest(&manifest_path, dir.path()).unwrap();
        assert!(matches!(
            report.checks[0].status,
            EntryStatus::SizeMismatch { expected: 13, actual: 5 }
        ));

        fs::remove_file(dir.path().join("A.zip")).unwrap();
        let report = verify_manifest(&manifest_path, dir.path()).unwrap();
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.checks[0].status, EntryStatus::Missing);
    }
}
