//! Run manifest (`info.json`).
//!
//! The manifest is the only output downstream consumers trust: one entry per
//! built archive, grouped into fixed sections, plus run-wide size totals.
//! It is accumulated in memory and written once, atomically, at the end.

use crate::classify::Classification;
use crate::error::{BuildError, BuildResult};
use crate::group::ArchiveKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "info.json";

/// Manifest sections, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestSection {
    Platforms,
    PlatformsRestricted,
    PlatformImages,
    PlatformImagesRestricted,
    Other,
}

impl ManifestSection {
    pub const ALL: [ManifestSection; 5] = [
        Self::Platforms,
        Self::PlatformsRestricted,
        Self::PlatformImages,
        Self::PlatformImagesRestricted,
        Self::Other,
    ];

    pub fn for_group(kind: ArchiveKind, classification: Classification) -> Self {
        match (kind, classification) {
            (ArchiveKind::Content, Classification::Standard) => Self::Platforms,
            (ArchiveKind::Content, Classification::Restricted) => Self::PlatformsRestricted,
            (ArchiveKind::Image, Classification::Standard) => Self::PlatformImages,
            (ArchiveKind::Image, Classification::Restricted) => Self::PlatformImagesRestricted,
            (ArchiveKind::Auxiliary, _) => Self::Other,
        }
    }

    /// JSON key of the section.
    pub fn key(self) -> &'static str {
        match self {
            Self::Platforms => "platforms",
            Self::PlatformsRestricted => "platformsNsfw",
            Self::PlatformImages => "platformImages",
            Self::PlatformImagesRestricted => "platformImagesNsfw",
            Self::Other => "other",
        }
    }
}

/// One built archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Display name (category or auxiliary bundle name).
    pub name: String,
    /// Archive file name inside the output directory.
    pub file: String,
    /// Display root the entries are stored under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Compressed size on disk.
    pub size: u64,
    /// Sum of the archived files' sizes.
    pub uncompressed_size: u64,
    /// Hex SHA-256 of the archive file.
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    #[serde(default)]
    pub platforms: Vec<ManifestEntry>,
    #[serde(default, rename = "platformsNsfw")]
    pub platforms_restricted: Vec<ManifestEntry>,
    #[serde(default)]
    pub platform_images: Vec<ManifestEntry>,
    #[serde(default, rename = "platformImagesNsfw")]
    pub platform_images_restricted: Vec<ManifestEntry>,
    #[serde(default)]
    pub other: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `section` and add it to the run totals.
    pub fn record(&mut self, section: ManifestSection, entry: ManifestEntry) {
        self.compressed_size += entry.size;
        self.uncompressed_size += entry.uncompressed_size;
        self.section_mut(section).push(entry);
    }

    pub fn entries(&self, section: ManifestSection) -> &[ManifestEntry] {
        match section {
            ManifestSection::Platforms => &self.platforms,
            ManifestSection::PlatformsRestricted => &self.platforms_restricted,
            ManifestSection::PlatformImages => &self.platform_images,
            ManifestSection::PlatformImagesRestricted => &self.platform_images_restricted,
            ManifestSection::Other => &self.other,
        }
    }

    fn section_mut(&mut self, section: ManifestSection) -> &mut Vec<ManifestEntry> {
        match section {
            ManifestSection::Platforms => &mut self.platforms,
            ManifestSection::PlatformsRestricted => &mut self.platforms_restricted,
            ManifestSection::PlatformImages => &mut self.platform_images,
            ManifestSection::PlatformImagesRestricted => &mut self.platform_images_restricted,
            ManifestSection::Other => &mut self.other,
        }
    }

    /// Every entry with its section, in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (ManifestSection, &ManifestEntry)> {
        ManifestSection::ALL
            .into_iter()
            .flat_map(move |s| self.entries(s).iter().map(move |e| (s, e)))
    }

    pub fn len(&self) -> usize {
        ManifestSection::ALL
            .iter()
            .map(|s| self.entries(*s).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write the manifest as pretty JSON, replacing any previous file.
///
/// The bytes go to `<path>.tmp` first and are renamed into place, so readers
/// never see a half-written manifest.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> BuildResult<PathBuf> {
    let fail = |message: String| BuildError::ManifestWrite {
        path: path.to_path_buf(),
        message,
    };
    let mut json = serde_json::to_vec_pretty(manifest).map_err(|e| fail(e.to_string()))?;
    json.push(b'\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = fs::write(&tmp, &json) {
        let _ = fs::remove_file(&tmp);
        return Err(fail(format!("write {}: {}", tmp.display(), e)));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        fail(format!("rename into place: {}", e))
    })?;
    Ok(path.to_path_buf())
}

/// Parse a manifest previously written by [`write_manifest`].
pub fn read_manifest(path: &Path) -> BuildResult<Manifest> {
    let fail = |message: String| BuildError::ManifestWrite {
        path: path.to_path_buf(),
        message,
    };
    let bytes = fs::read(path).map_err(|e| fail(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| fail(format!("parse: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, size: u64) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            file: format!("Test_{}_20240309.zip", name),
            path: Some("Games".to_string()),
            size,
            uncompressed_size: size * 2,
            hash: "00".repeat(32),
        }
    }

    #[test]
    fn record_routes_sections_and_sums_totals() {
        let mut manifest = Manifest::new();
        manifest.record(ManifestSection::Platforms, entry("A", 10));
        manifest.record(ManifestSection::PlatformsRestricted, entry("A", 5));
        manifest.record(ManifestSection::Other, entry("Legacy", 1));

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.compressed_size, 16);
        assert_eq!(manifest.uncompressed_size, 32);
        assert_eq!(manifest.entries(ManifestSection::PlatformsRestricted)[0].size, 5);
        let order: Vec<_> = manifest.iter().map(|(s, _)| s).collect();
        assert_eq!(
            order,
            vec![
                ManifestSection::Platforms,
                ManifestSection::PlatformsRestricted,
                ManifestSection::Other
            ]
        );
    }

    #[test]
    fn serializes_with_stable_keys_and_order() {
        let mut manifest = Manifest::new();
        manifest.record(ManifestSection::PlatformImages, entry("A", 3));
        let json = serde_json::to_string_pretty(&manifest).unwrap();

        let keys = [
            "\"compressedSize\"",
            "\"uncompressedSize\"",
            "\"platforms\"",
            "\"platformsNsfw\"",
            "\"platformImages\"",
            "\"platformImagesNsfw\"",
            "\"other\"",
        ];
        let positions: Vec<_> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", json);
        assert!(json.contains("\"uncompressedSize\": 6"));
        assert!(json.contains("\"path\": \"Games\""));
    }

    #[test]
    fn absent_path_is_omitted() {
        let mut e = entry("A", 1);
        e.path = None;
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("\"path\""));
    }

    #[test]
    fn write_replaces_previous_manifest_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(&path, vec![b'x'; 4096]).unwrap();

        let mut manifest = Manifest::new();
        manifest.record(ManifestSection::Platforms, entry("A", 10));
        write_manifest(&manifest, &path).unwrap();

        assert_eq!(read_manifest(&path).unwrap(), manifest);
        assert!(!dir.path().join("info.json.tmp").exists());
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_manifest(&Manifest::new(), &dir.path().join("nope/info.json")).unwrap_err();
        assert!(matches!(err, BuildError::ManifestWrite { .. }));
    }
}
