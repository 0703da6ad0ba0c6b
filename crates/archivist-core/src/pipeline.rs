//! End-to-end build: plan groups, build and hash each archive, write the
//! manifest.
//!
//! Strictly sequential. Each archive goes write, close, reopen, hash before
//! the next one starts, and its manifest entry is recorded only after that.
//! Any error returns before the manifest is written.

use crate::archive::{ArchiveBuilder, BuiltArchive};
use crate::catalog::CatalogSource;
use crate::classify::Classification;
use crate::config::BuildConfig;
use crate::error::BuildResult;
use crate::group::{ArchiveGroup, ArchiveKind, Grouper};
use crate::integrity;
use crate::manifest::{write_manifest, Manifest, ManifestEntry};
use crate::walk::list_tree;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// A group together with the roots its entry names are computed from.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedGroup {
    #[serde(flatten)]
    pub group: ArchiveGroup,
    pub source_root: PathBuf,
    pub display: String,
}

/// Everything that would be archived, in build order: catalog content
/// groups, catalog image groups, then auxiliary bundles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunPlan {
    pub groups: Vec<PlannedGroup>,
}

impl RunPlan {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|p| p.group.files.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub archives: Vec<BuiltArchive>,
}

impl RunSummary {
    pub fn skipped_files(&self) -> usize {
        self.archives.iter().map(|a| a.skipped.len()).sum()
    }
}

pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    builder: ArchiveBuilder,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a BuildConfig, date: NaiveDate) -> Self {
        let builder = ArchiveBuilder::new(&config.output_dir, &config.archive_prefix, date);
        Self { config, builder }
    }

    pub fn builder(&self) -> &ArchiveBuilder {
        &self.builder
    }

    /// Enumerate catalog and auxiliary groups without writing anything.
    ///
    /// Catalog failures surface here, before any archive exists.
    pub fn plan<S: CatalogSource>(&self, source: &S) -> BuildResult<RunPlan> {
        let config = self.config;
        let restricted = config.restricted();
        let grouper = Grouper::new(
            &restricted,
            &config.content.source,
            &config.images.source,
            &config.image_extension,
        );

        let mut plan = RunPlan::default();
        for group in grouper.plan(source)? {
            let roots = match group.kind {
                ArchiveKind::Image => &config.images,
                _ => &config.content,
            };
            plan.groups.push(PlannedGroup {
                group,
                source_root: roots.source.clone(),
                display: roots.display.clone(),
            });
        }

        for aux in &config.auxiliary {
            let mut group =
                ArchiveGroup::new(&aux.name, Classification::Standard, ArchiveKind::Auxiliary);
            group.files = list_tree(&aux.source, config.walk_policy)?;
            if group.is_empty() {
                info!(bundle = %aux.name, "auxiliary tree is empty, not archived");
                continue;
            }
            plan.groups.push(PlannedGroup {
                group,
                source_root: aux.source.clone(),
                display: aux.display.clone(),
            });
        }
        Ok(plan)
    }

    /// Build every archive and write the manifest.
    pub fn run<S: CatalogSource>(&self, source: &S) -> BuildResult<RunSummary> {
        let plan = self.plan(source)?;
        info!(
            groups = plan.len(),
            files = plan.file_count(),
            "plan ready"
        );

        let mut manifest = Manifest::new();
        let mut archives = Vec::with_capacity(plan.len());
        for planned in &plan.groups {
            archives.push(self.build_group(planned, &mut manifest)?);
        }

        let manifest_path = self.config.manifest_path();
        info!(path = %manifest_path.display(), entries = manifest.len(), "writing manifest");
        write_manifest(&manifest, &manifest_path)?;
        info!(
            archives = archives.len(),
            compressed = manifest.compressed_size,
            uncompressed = manifest.uncompressed_size,
            "done"
        );

        Ok(RunSummary {
            manifest_path,
            manifest,
            archives,
        })
    }

    /// Build one archive, hash it through a fresh handle, record its entry.
    pub fn build_group(
        &self,
        planned: &PlannedGroup,
        manifest: &mut Manifest,
    ) -> BuildResult<BuiltArchive> {
        let group = &planned.group;
        let built = self
            .builder
            .build(group, &planned.source_root, &planned.display)?;
        let integrity = integrity::record(&built.path)?;
        info!(
            archive = %built.file_name,
            size = integrity.size,
            hash = %integrity.sha256,
            "archive recorded"
        );

        let path = self
            .config
            .manifest
            .include_paths
            .then(|| planned.display.clone());
        manifest.record(
            group.section(),
            ManifestEntry {
                name: group.name.clone(),
                file: built.file_name.clone(),
                path,
                size: integrity.size,
                uncompressed_size: built.uncompressed_bytes,
                hash: integrity.sha256,
            },
        );
        Ok(built)
    }
}
