use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, action: &str, confidence: u8, files: &[String]) -> Result<()> {
    let warnings = services::log_action(paths, &FsStorage, action, confidence, files)?;
    super::print_warnings(&warnings);

    println!(
        "{}",
        format!("Logged action (confidence {confidence}/10)").green()
    );
    Ok(())
}
