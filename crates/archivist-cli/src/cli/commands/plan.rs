use super::{load_config, today};
use crate::cli::args::{OutputFormat, PlanArgs};
use crate::exit_codes::SUCCESS;
use archivist_core::{Pipeline, SqliteCatalog};
use std::path::Path;

pub fn run(config_path: &Path, args: PlanArgs) -> anyhow::Result<i32> {
    let config = load_config(config_path)?;
    let catalog = SqliteCatalog::open(&config.database)?;
    let pipeline = Pipeline::new(&config, args.date.unwrap_or_else(today));
    let plan = pipeline.plan(&catalog)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => {
            for planned in &plan.groups {
                let group = &planned.group;
                println!(
                    "{}\t{}\t{} file(s)",
                    pipeline.builder().archive_name(&group.name, group.suffix()),
                    group.section().key(),
                    group.files.len()
                );
            }
            eprintln!(
                "plan: {} archive(s), {} file(s)",
                plan.len(),
                plan.file_count()
            );
        }
    }
    Ok(SUCCESS)
}
