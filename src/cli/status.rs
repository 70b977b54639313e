use crate::config::WorkspacePaths;
use crate::parser::section::locate_section;
use crate::services;
use crate::storage::{FsStorage, Storage};
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths) -> Result<()> {
    println!("{}", "Workspace status".cyan().bold());
    println!();

    if FsStorage.exists(&paths.active_task_file) {
        let active = FsStorage.read_to_string(&paths.active_task_file)?;
        match locate_section(&active, "Task Information") {
            Some(section) => {
                println!("{}", "Active task:".bold());
                for line in section.content.lines() {
                    println!("   {line}");
                }
            }
            None => println!("{}", "Active task document has no Task Information".yellow()),
        }
        if let Some(section) = locate_section(&active, "Current Element") {
            println!();
            println!("{}", "Current element:".bold());
            for line in section.content.lines() {
                println!("   {line}");
            }
        }
    } else {
        println!("{}", "No active task.".yellow());
    }

    let summary = services::progress_summary(paths, &FsStorage)?;
    println!();
    println!(
        "{} {} of {} elements complete ({}%)",
        "Progress:".bold(),
        summary.completed_elements,
        summary.total_elements,
        summary.completion_percentage
    );
    Ok(())
}
