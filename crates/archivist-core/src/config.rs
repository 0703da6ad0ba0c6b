//! Build configuration.
//!
//! Loaded once from YAML. JSON is valid YAML, so a `config.json` written for
//! older tooling parses unchanged.

use crate::classify::RestrictedTags;
use crate::error::{BuildError, BuildResult};
use crate::manifest::MANIFEST_FILE;
use crate::walk::WalkPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A source tree and the display root its entries are stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeRoots {
    pub source: PathBuf,
    #[serde(default)]
    pub display: String,
}

/// A fixed, non-catalog bundle built from a whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuxiliaryBundle {
    pub name: String,
    pub source: PathBuf,
    #[serde(default)]
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestOptions {
    #[serde(default = "default_manifest_file")]
    pub file_name: String,
    /// Emit `path` on every entry (or on none).
    #[serde(default = "default_true")]
    pub include_paths: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            file_name: default_manifest_file(),
            include_paths: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub database: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_prefix")]
    pub archive_prefix: String,
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
    #[serde(default)]
    pub walk_policy: WalkPolicy,
    #[serde(default)]
    pub restricted_tags: Vec<String>,
    pub content: TreeRoots,
    pub images: TreeRoots,
    #[serde(default)]
    pub auxiliary: Vec<AuxiliaryBundle>,
    #[serde(default)]
    pub manifest: ManifestOptions,
}

fn default_prefix() -> String {
    "Flashpoint".to_string()
}

fn default_image_extension() -> String {
    "png".to_string()
}

fn default_manifest_file() -> String {
    MANIFEST_FILE.to_string()
}

fn default_true() -> bool {
    true
}

impl BuildConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> BuildResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::config(path, format!("cannot read: {}", e)))?;
        let config = Self::from_yaml(&content).map_err(|e| match e {
            BuildError::Config { message, .. } => BuildError::config(path, message),
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str) -> BuildResult<Self> {
        let config: BuildConfig = serde_yaml::from_str(content)
            .map_err(|e| BuildError::config("<inline>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BuildResult<()> {
        let invalid = |message: String| Err(BuildError::config("<inline>", message));
        if self.archive_prefix.trim().is_empty() {
            return invalid("archive_prefix must not be empty".into());
        }
        if self.image_extension.trim().is_empty() || self.image_extension.contains('.') {
            return invalid(format!(
                "image_extension must be a bare extension, got {:?}",
                self.image_extension
            ));
        }
        let file_name = Path::new(&self.manifest.file_name);
        if self.manifest.file_name.is_empty() || file_name.components().count() != 1 {
            return invalid(format!(
                "manifest.file_name must be a plain file name, got {:?}",
                self.manifest.file_name
            ));
        }
        let mut seen = HashSet::new();
        for aux in &self.auxiliary {
            if aux.name.trim().is_empty() {
                return invalid("auxiliary bundle name must not be empty".into());
            }
            if !seen.insert(aux.name.as_str()) {
                return invalid(format!("duplicate auxiliary bundle {:?}", aux.name));
            }
        }
        Ok(())
    }

    pub fn restricted(&self) -> RestrictedTags {
        RestrictedTags::new(self.restricted_tags.iter().cloned())
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest.file_name)
    }
}
