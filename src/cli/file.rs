use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths, file_path: &str, primary: bool) -> Result<()> {
    let added = services::add_implementation_file(paths, &FsStorage, file_path, primary)?;

    if added {
        let kind = if primary { "primary" } else { "additional" };
        println!(
            "{}",
            format!("Registered {kind} implementation file: {file_path}").green()
        );
    } else {
        println!(
            "{}",
            format!("File already registered: {file_path}").yellow()
        );
    }
    Ok(())
}
