use crate::config::WorkspacePaths;
use crate::services;
use crate::storage::FsStorage;
use crate::Result;
use colored::Colorize;

pub fn run(paths: &WorkspacePaths) -> Result<()> {
    println!("{}", "Resetting workspace state files...".cyan());

    let steps = services::reset_all(paths, &FsStorage)?;
    for step in &steps {
        println!("   {} {step}", "✓".green());
    }

    println!("{}", "Workspace initialized.".green());
    Ok(())
}
