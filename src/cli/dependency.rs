use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, task_id: &str, dependency: &str) -> Result<()> {
    let warnings = services::log_dependency(paths, &FsStorage, task_id, dependency)?;
    super::print_warnings(&warnings);

    println!(
        "{}",
        format!("Logged dependency discovery for {task_id}").green()
    );
    Ok(())
}
