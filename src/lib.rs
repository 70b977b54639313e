// Pmcore - Persistent state engine for a multi-phase task-tracking workflow
// State lives in semi-structured markdown documents rather than a database.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod mutate;
pub mod parser;
pub mod services;
pub mod storage;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::WorkspacePaths;
pub use error::EngineError;
pub use models::{ElementStatus, PhaseAbbr, StageStatus};
pub use parser::{SectionTree, TemplateOutput};
pub use storage::{FsStorage, Storage};
