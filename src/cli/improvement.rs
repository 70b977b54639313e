use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, task_id: &str, suggestion: &str) -> Result<()> {
    let warnings = services::log_improvement(paths, &FsStorage, task_id, suggestion)?;
    super::print_warnings(&warnings);

    println!(
        "{}",
        format!("Logged improvement suggestion for {task_id}").green()
    );
    Ok(())
}
