//! Streaming zip archive writer.
//!
//! Every archive is rebuilt from scratch: the destination file is truncated,
//! entries are streamed one by one from disk, and the file is synced and
//! closed before [`ArchiveBuilder::build`] returns. Entries carry a fixed
//! modification time so identical inputs give byte-identical archives.
//!
//! A source file that no longer exists is a stale catalog reference, not an
//! environment failure: it is logged and skipped. So is a second reference
//! to an entry name already written, since a zip holds each name once.
//! Everything else aborts.

use crate::error::{BuildError, BuildResult};
use crate::group::{ArchiveGroup, SourceFileRef};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archive file extension.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Files at or above this size need zip64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Result of archiving one source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// File streamed; uncompressed byte count.
    Written(u64),
    /// Directory placeholder created.
    Directory,
    /// Reference resolved to the source root itself.
    Root,
    /// Source file missing; the archive continues without it.
    Skipped,
    /// Entry name already written by an earlier reference in the group.
    Duplicate,
}

/// A finalized archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArchive {
    pub file_name: String,
    pub path: PathBuf,
    /// Entries actually present in the archive (files and directories).
    pub entries: usize,
    pub skipped: Vec<PathBuf>,
    /// References whose entry name was already in the archive.
    pub duplicates: Vec<PathBuf>,
    /// Sum of source file sizes streamed into the archive.
    pub uncompressed_bytes: u64,
}

/// Writes archives for groups into one output directory.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    output_dir: PathBuf,
    prefix: String,
    date: NaiveDate,
}

impl ArchiveBuilder {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            date,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<prefix>_<name><suffix>_<YYYYMMDD>.zip`, with whitespace and path
    /// separators in `name` replaced by `_`.
    pub fn archive_name(&self, name: &str, suffix: &str) -> String {
        let name: String = name
            .chars()
            .map(|c| {
                if c.is_whitespace() || c == '/' || c == '\\' {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        format!(
            "{}_{}{}_{}.{}",
            self.prefix,
            name,
            suffix,
            self.date.format("%Y%m%d"),
            ARCHIVE_EXTENSION
        )
    }

    /// Build the archive for `group`.
    ///
    /// Entry names are the file paths relative to `source_root`, prefixed
    /// with `dest_root` when it is non-empty.
    pub fn build(
        &self,
        group: &ArchiveGroup,
        source_root: &Path,
        dest_root: &str,
    ) -> BuildResult<BuiltArchive> {
        let file_name = self.archive_name(&group.name, group.suffix());
        let path = self.output_dir.join(&file_name);
        info!(archive = %file_name, files = group.files.len(), "creating archive");

        let file = File::create(&path).map_err(|source| BuildError::ArchiveIo {
            path: path.clone(),
            source,
        })?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut built = BuiltArchive {
            file_name,
            path,
            entries: 0,
            skipped: Vec::new(),
            duplicates: Vec::new(),
            uncompressed_bytes: 0,
        };

        let mut written = HashSet::new();
        for file in &group.files {
            let outcome = self.append(
                &mut zip,
                options,
                &built.path,
                &mut written,
                file,
                source_root,
                dest_root,
            )?;
            match outcome {
                EntryOutcome::Written(bytes) => {
                    built.entries += 1;
                    built.uncompressed_bytes += bytes;
                }
                EntryOutcome::Directory => built.entries += 1,
                EntryOutcome::Root => {}
                EntryOutcome::Skipped => built.skipped.push(file.path.clone()),
                EntryOutcome::Duplicate => built.duplicates.push(file.path.clone()),
            }
        }

        let writer = zip.finish().map_err(|source| BuildError::Archive {
            path: built.path.clone(),
            source,
        })?;
        let file = writer
            .into_inner()
            .map_err(|e| BuildError::ArchiveIo {
                path: built.path.clone(),
                source: e.into_error(),
            })?;
        file.sync_all().map_err(|source| BuildError::ArchiveIo {
            path: built.path.clone(),
            source,
        })?;
        drop(file);

        if !built.skipped.is_empty() {
            warn!(
                archive = %built.file_name,
                skipped = built.skipped.len(),
                "archive finalized with missing source files"
            );
        }
        if !built.duplicates.is_empty() {
            warn!(
                archive = %built.file_name,
                duplicates = built.duplicates.len(),
                "archive finalized with repeated entry names"
            );
        }
        Ok(built)
    }

    #[allow(clippy::too_many_arguments)]
    fn append<W: Write + io::Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        archive: &Path,
        written: &mut HashSet<String>,
        file: &SourceFileRef,
        source_root: &Path,
        dest_root: &str,
    ) -> BuildResult<EntryOutcome> {
        let Some(name) = entry_path(&file.path, source_root, dest_root) else {
            return Ok(EntryOutcome::Root);
        };
        let zip_err = |source| BuildError::Archive {
            path: archive.to_path_buf(),
            source,
        };

        let name = if file.is_dir { format!("{}/", name) } else { name };
        if written.contains(&name) {
            warn!(entry = %name, path = %file.path.display(), "entry already in archive, skipping");
            return Ok(EntryOutcome::Duplicate);
        }

        if file.is_dir {
            zip.add_directory(name.as_str(), options).map_err(zip_err)?;
            written.insert(name);
            return Ok(EntryOutcome::Directory);
        }

        let mut source = match File::open(&file.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %file.path.display(), "source file does not exist, skipping");
                return Ok(EntryOutcome::Skipped);
            }
            Err(source) => {
                return Err(BuildError::ArchiveIo {
                    path: file.path.clone(),
                    source,
                })
            }
        };
        let io_err = |source| BuildError::ArchiveIo {
            path: file.path.clone(),
            source,
        };
        let len = source.metadata().map_err(io_err)?.len();

        zip.start_file(name.as_str(), options.large_file(len >= ZIP64_THRESHOLD))
            .map_err(zip_err)?;
        let copied = io::copy(&mut source, zip).map_err(io_err)?;
        debug!(entry = %name, bytes = copied, "entry written");
        written.insert(name);
        Ok(EntryOutcome::Written(copied))
    }
}

/// Archive-internal name for `file`: relative to `source_root`, forward
/// slashes, no leading separator, prefixed by `dest_root`.
///
/// Only normal path components survive, so `..`, `.` and drive prefixes
/// never reach the archive. Returns `None` for the root itself.
pub fn entry_path(file: &Path, source_root: &Path, dest_root: &str) -> Option<String> {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let relative = normal_components(relative);
    if relative.is_empty() {
        return None;
    }
    let prefix = normal_components(Path::new(dest_root));
    if prefix.is_empty() {
        Some(relative)
    } else {
        Some(format!("{}/{}", prefix, relative))
    }
}

fn normal_components(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
