use super::{load_config, today};
use crate::cli::args::BuildArgs;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use archivist_core::{Pipeline, SqliteCatalog};
use std::path::Path;

pub fn run(config_path: &Path, args: BuildArgs) -> anyhow::Result<i32> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let date = args.date.unwrap_or_else(today);
    let catalog = SqliteCatalog::open(&config.database)?;
    let summary = Pipeline::new(&config, date).run(&catalog)?;

    let skipped = summary.skipped_files();
    if skipped > 0 {
        eprintln!("warning: {} source file(s) were missing and skipped", skipped);
    }
    eprintln!(
        "build: {} archive(s), {} bytes compressed, {} bytes uncompressed",
        summary.archives.len(),
        summary.manifest.compressed_size,
        summary.manifest.uncompressed_size
    );
    eprintln!("manifest written: {}", summary.manifest_path.display());
    Ok(SUCCESS)
}
