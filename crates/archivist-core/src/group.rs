//! Partitioning of catalog rows into archive groups.
//!
//! Each category yields up to four groups: content and image archives, each
//! split into a standard and a restricted bucket. Auxiliary groups come from
//! filesystem trees instead of the catalog (see [`crate::walk`]).

use crate::catalog::CatalogSource;
use crate::classify::{split_tags, Classification, RestrictedTags};
use crate::error::BuildResult;
use crate::manifest::ManifestSection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Image families stored per item, in the order they are bundled.
pub const IMAGE_FOLDERS: &[&str] = &["Logos", "Screenshots"];

/// Where the files of an archive come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Content,
    Image,
    Auxiliary,
}

/// A file (or directory placeholder) to be placed in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFileRef {
    pub path: PathBuf,
    /// Directory placeholder: archived as an empty `name/` entry.
    pub is_dir: bool,
}

impl SourceFileRef {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// The unit of archiving: one (name, classification, kind) with its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveGroup {
    /// Display name; the category for catalog groups.
    pub name: String,
    pub classification: Classification,
    pub kind: ArchiveKind,
    /// Discovery order, duplicates kept.
    pub files: Vec<SourceFileRef>,
}

impl ArchiveGroup {
    pub fn new(name: impl Into<String>, classification: Classification, kind: ArchiveKind) -> Self {
        Self {
            name: name.into(),
            classification,
            kind,
            files: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File-name suffix distinguishing the variants of one category.
    pub fn suffix(&self) -> &'static str {
        match (self.kind, self.classification) {
            (ArchiveKind::Content, Classification::Standard) => "",
            (ArchiveKind::Content, Classification::Restricted) => "_NSFW",
            (ArchiveKind::Image, Classification::Standard) => "_Images",
            (ArchiveKind::Image, Classification::Restricted) => "_Images_NSFW",
            (ArchiveKind::Auxiliary, _) => "",
        }
    }

    pub fn section(&self) -> ManifestSection {
        ManifestSection::for_group(self.kind, self.classification)
    }
}

/// True iff `category` is one of the exact tokens of the joined column.
///
/// Substring matches do not count: `SNES` is not a member of
/// `"Super SNES Extended"`.
pub fn is_member(joined_categories: &str, category: &str) -> bool {
    split_tags(joined_categories).any(|c| c == category)
}

/// Two-level sharded path for an item's image: `ab/cd/abcdef.png`.
///
/// Returns `None` when the id is too short to shard.
pub fn shard_path(id: &str, extension: &str) -> Option<PathBuf> {
    let first = id.get(0..2)?;
    let second = id.get(2..4)?;
    Some(
        Path::new(first)
            .join(second)
            .join(format!("{}.{}", id, extension)),
    )
}

/// Builds archive groups from catalog rows.
#[derive(Debug, Clone)]
pub struct Grouper<'a> {
    restricted: &'a RestrictedTags,
    content_root: &'a Path,
    image_root: &'a Path,
    image_extension: &'a str,
}

impl<'a> Grouper<'a> {
    pub fn new(
        restricted: &'a RestrictedTags,
        content_root: &'a Path,
        image_root: &'a Path,
        image_extension: &'a str,
    ) -> Self {
        Self {
            restricted,
            content_root,
            image_root,
            image_extension,
        }
    }

    /// Non-empty groups for one category, content before images, standard
    /// before restricted.
    pub fn group_category<S: CatalogSource>(
        &self,
        source: &S,
        category: &str,
    ) -> BuildResult<Vec<ArchiveGroup>> {
        let mut content = [
            ArchiveGroup::new(category, Classification::Standard, ArchiveKind::Content),
            ArchiveGroup::new(category, Classification::Restricted, ArchiveKind::Content),
        ];
        for row in source.content_rows(category)? {
            if !is_member(&row.categories, category) {
                continue;
            }
            let bucket = self.restricted.classify(&row.tags);
            content[bucket_index(bucket)]
                .files
                .push(SourceFileRef::file(self.content_root.join(&row.path)));
        }

        let mut images = [
            ArchiveGroup::new(category, Classification::Standard, ArchiveKind::Image),
            ArchiveGroup::new(category, Classification::Restricted, ArchiveKind::Image),
        ];
        for row in source.image_rows(category)? {
            if !is_member(&row.categories, category) {
                continue;
            }
            let Some(sharded) = shard_path(&row.id, self.image_extension) else {
                warn!(id = %row.id, category, "item id too short to shard, images skipped");
                continue;
            };
            let bucket = self.restricted.classify(&row.tags);
            let files = &mut images[bucket_index(bucket)].files;
            for folder in IMAGE_FOLDERS {
                files.push(SourceFileRef::file(
                    self.image_root.join(folder).join(&sharded),
                ));
            }
        }

        let groups: Vec<_> = content
            .into_iter()
            .chain(images)
            .filter(|g| {
                if g.is_empty() {
                    debug!(category, suffix = g.suffix(), "empty group discarded");
                }
                !g.is_empty()
            })
            .collect();
        Ok(groups)
    }

    /// Groups for every catalog category: all content groups first, then all
    /// image groups.
    pub fn plan<S: CatalogSource>(&self, source: &S) -> BuildResult<Vec<ArchiveGroup>> {
        let categories = source.categories()?;
        info!(count = categories.len(), "categories discovered");

        let mut content = Vec::new();
        let mut images = Vec::new();
        for category in &categories {
            info!(category = %category, "fetching entries");
            for group in self.group_category(source, category)? {
                match group.kind {
                    ArchiveKind::Image => images.push(group),
                    _ => content.push(group),
                }
            }
        }
        content.extend(images);
        Ok(content)
    }
}

fn bucket_index(classification: Classification) -> usize {
    match classification {
        Classification::Standard => 0,
        Classification::Restricted => 1,
    }
}
