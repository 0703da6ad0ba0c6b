use super::args::*;
use archivist_core::BuildError;
use std::path::Path;

pub(crate) mod build;
pub(crate) mod plan;
pub(crate) mod verify;

use crate::exit_codes::BUILD_FAILED;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Build(args) => build::run(&cli.config, args),
        Command::Plan(args) => plan::run(&cli.config, args),
        Command::Verify(args) => verify::run(&cli.config, args),
    }
}

/// Map a fatal error to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BuildError>())
        .map_or(BUILD_FAILED, BuildError::exit_code)
}

fn load_config(path: &Path) -> anyhow::Result<archivist_core::BuildConfig> {
    let config = archivist_core::BuildConfig::load(path)?;
    tracing::debug!(config = %path.display(), "configuration loaded");
    Ok(config)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
