use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, task_id: &str, phase: &str, status: &str) -> Result<()> {
    let message = services::update_phase_stage(paths, &FsStorage, task_id, phase, status)?;
    println!("{}", message.green());
    Ok(())
}
