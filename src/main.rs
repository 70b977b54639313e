use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use pmcore::{Result, WorkspacePaths};
use std::env;
use std::io;

#[derive(Parser)]
#[command(name = "pmcore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Persistent state engine for a multi-phase task-tracking workflow", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset all workspace state files, archiving the task history first
    Init,

    /// Start a task from the breakdown document
    #[command(name = "start-task")]
    StartTask {
        /// Task ID (e.g., "T-1.1")
        task_id: String,
    },

    /// Log a micro-action against the active task
    #[command(name = "log-action")]
    LogAction {
        /// Action description
        action: String,

        /// Confidence level, 1-10
        #[arg(short, long)]
        confidence: u8,

        /// Related file paths (repeatable)
        #[arg(short, long = "file")]
        files: Vec<String>,
    },

    /// Update the active task's confidence level
    #[command(name = "update-confidence")]
    UpdateConfidence {
        /// Confidence level, 1-10
        confidence: u8,
    },

    /// Register an expected implementation file for the active task
    #[command(name = "add-file")]
    AddFile {
        /// File path to register
        path: String,

        /// Register under "Primary:" instead of "Additional Files:"
        #[arg(short, long)]
        primary: bool,
    },

    /// Log an improvement suggestion outside the current task scope
    #[command(name = "log-improvement")]
    LogImprovement {
        /// Task ID the suggestion came up in
        task_id: String,

        /// Suggestion text, optionally with Description/Rationale/Priority fields
        suggestion: String,
    },

    /// Log a discovered dependency
    #[command(name = "log-dependency")]
    LogDependency {
        /// Task ID the dependency came up in
        task_id: String,

        /// Dependency description, optionally with Blocking/Affected Tasks fields
        dependency: String,
    },

    /// Update one element's status across the state documents
    #[command(name = "update-element")]
    UpdateElement {
        /// Full element ID (e.g., "T-1.1:ELE-2")
        element_id: String,

        /// New status (e.g., "In Progress", "Complete")
        status: String,
    },

    /// Update a phase stage glyph in the phase view
    #[command(name = "update-phase-stage")]
    UpdatePhaseStage {
        /// Task ID (e.g., "T-1.1")
        task_id: String,

        /// Phase abbreviation: PREP, IMP, or VAL
        phase: String,

        /// Stage status: "not started", "active", or "complete"
        status: String,
    },

    /// Show the active task and overall progress
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "pmcore", &mut io::stdout());
        return Ok(());
    }

    let paths = WorkspacePaths::resolve(env::current_dir()?)?;

    match cli.command {
        Commands::Init => pmcore::cli::init::run(&paths)?,
        Commands::StartTask { task_id } => pmcore::cli::start::run(&paths, &task_id)?,
        Commands::LogAction {
            action,
            confidence,
            files,
        } => pmcore::cli::action::run(&paths, &action, confidence, &files)?,
        Commands::UpdateConfidence { confidence } => {
            pmcore::cli::confidence::run(&paths, confidence)?
        }
        Commands::AddFile { path, primary } => pmcore::cli::file::run(&paths, &path, primary)?,
        Commands::LogImprovement {
            task_id,
            suggestion,
        } => pmcore::cli::improvement::run(&paths, &task_id, &suggestion)?,
        Commands::LogDependency {
            task_id,
            dependency,
        } => pmcore::cli::dependency::run(&paths, &task_id, &dependency)?,
        Commands::UpdateElement { element_id, status } => {
            pmcore::cli::element::run(&paths, &element_id, &status)?
        }
        Commands::UpdatePhaseStage {
            task_id,
            phase,
            status,
        } => pmcore::cli::phase::run(&paths, &task_id, &phase, &status)?,
        Commands::Status => pmcore::cli::status::run(&paths)?,
        Commands::Completions { .. } => unreachable!("handled before path resolution"),
    }

    Ok(())
}
