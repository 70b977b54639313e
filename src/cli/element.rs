use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, element_id: &str, status: &str) -> Result<()> {
    let warnings = services::update_element_status(paths, &FsStorage, element_id, status)?;
    super::print_warnings(&warnings);

    let summary = services::progress_summary(paths, &FsStorage)?;
    println!(
        "{}",
        format!("Updated {element_id} to \"{status}\"").green()
    );
    println!(
        "   {} of {} elements complete ({}%)",
        summary.completed_elements, summary.total_elements, summary.completion_percentage
    );
    Ok(())
}
