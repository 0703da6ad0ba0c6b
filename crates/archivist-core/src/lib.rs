//! Archive-build pipeline for curated content collections.
//!
//! This crate turns a catalog of categorised items into distributable zip
//! archives, one per (category, classification, kind) group, and records a
//! manifest (`info.json`) with the size and SHA-256 of every archive.
//!
//! - Classification of items into standard / restricted by tag set
//! - Grouping of catalog rows per category, with exact membership tokens
//! - Deterministic tree enumeration for auxiliary bundles
//! - Streaming zip writer that skips stale file references
//! - Integrity recording over a fresh read handle
//! - Atomic manifest writing and downstream verification
//!
//! # Quick Start
//!
//! ```no_run
//! use archivist_core::{BuildConfig, Pipeline, SqliteCatalog};
//! use std::path::Path;
//!
//! # fn example() -> archivist_core::BuildResult<()> {
//! let config = BuildConfig::load(Path::new("archivist.yaml"))?;
//! let catalog = SqliteCatalog::open(&config.database)?;
//! let summary = Pipeline::new(&config, chrono::Local::now().date_naive()).run(&catalog)?;
//! println!("wrote {}", summary.manifest_path.display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod group;
pub mod integrity;
pub mod manifest;
pub mod pipeline;
pub mod verify;
pub mod walk;

pub use archive::{ArchiveBuilder, BuiltArchive, EntryOutcome};
pub use catalog::{CatalogSource, ContentRow, ImageRow, SqliteCatalog};
pub use classify::{split_tags, Classification, RestrictedTags};
pub use config::{AuxiliaryBundle, BuildConfig, ManifestOptions, TreeRoots};
pub use error::{BuildError, BuildResult};
pub use group::{ArchiveGroup, ArchiveKind, Grouper, SourceFileRef};
pub use integrity::{record, Integrity};
pub use manifest::{read_manifest, write_manifest, Manifest, ManifestEntry, ManifestSection};
pub use pipeline::{Pipeline, PlannedGroup, RunPlan, RunSummary};
pub use verify::{verify_manifest, EntryCheck, EntryStatus, VerifyReport};
pub use walk::{list_tree, WalkPolicy};
