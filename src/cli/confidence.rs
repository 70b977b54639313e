use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, confidence: u8) -> Result<()> {
    services::update_confidence(paths, &FsStorage, confidence)?;
    println!(
        "{}",
        format!("Updated task confidence to {confidence}/10").green()
    );
    Ok(())
}
