use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, task_id: &str) -> Result<()> {
    println!("{}", format!("Starting task: {task_id}").cyan());

    let outcome = services::start_task(paths, &FsStorage, task_id)?;
    super::print_warnings(&outcome.warnings);

    println!(
        "{}",
        format!("Active task is now {}: {}", outcome.task_id, outcome.title).green()
    );
    Ok(())
}
