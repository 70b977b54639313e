//! Workspace path configuration
//!
//! All document paths are resolved once per invocation into an explicit
//! `WorkspacePaths` value that gets passed into each component. There is no
//! process-wide mutable path table. Paths may be overridden through an
//! optional `pmcore.toml` at the workspace root.

use crate::error::{EngineError, EngineResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Logical roles of the documents the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    Progress,
    ProgressPhase,
    ActiveTask,
    ActionLog,
    TaskBreakdown,
    ImprovementLog,
    DependencyLog,
    Approach,
    TaskLog,
    TaskHistory,
}

/// Optional overrides loaded from `pmcore.toml`.
#[derive(Debug, Default, Deserialize)]
struct PathOverrides {
    #[serde(default)]
    core_dir: Option<PathBuf>,
    #[serde(default)]
    archive_dir: Option<PathBuf>,
    #[serde(default)]
    templates_dir: Option<PathBuf>,
    #[serde(default)]
    task_breakdown_file: Option<PathBuf>,
}

/// Resolved paths for one invocation.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub progress_file: PathBuf,
    pub progress_phase_file: PathBuf,
    pub active_task_file: PathBuf,
    pub action_log_file: PathBuf,
    pub task_breakdown_file: PathBuf,
    pub improvement_file: PathBuf,
    pub dependency_file: PathBuf,
    pub approach_file: PathBuf,
    pub task_log_file: PathBuf,
    pub task_history_file: PathBuf,
    pub archive_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl WorkspacePaths {
    /// Resolve paths under a workspace root, applying `pmcore.toml` overrides
    /// when the file exists.
    pub fn resolve(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        let config_path = root.join("pmcore.toml");

        let overrides = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| EngineError::io(&config_path, e))?;
            toml::from_str(&content)
                .map_err(|e| EngineError::Validation(format!("invalid pmcore.toml: {e}")))?
        } else {
            PathOverrides::default()
        };

        Ok(Self::with_overrides(root, overrides))
    }

    fn with_overrides(root: PathBuf, overrides: PathOverrides) -> Self {
        let core_dir = overrides
            .core_dir
            .map(|d| root.join(d))
            .unwrap_or_else(|| root.join("core"));
        let archive_dir = overrides
            .archive_dir
            .map(|d| root.join(d))
            .unwrap_or_else(|| root.join("_archive").join("active-task-history"));
        let templates_dir = overrides
            .templates_dir
            .map(|d| root.join(d))
            .unwrap_or_else(|| root.join("templates"));
        let task_breakdown_file = overrides
            .task_breakdown_file
            .map(|f| root.join(f))
            .unwrap_or_else(|| core_dir.join("task-breakdown.md"));

        Self {
            progress_file: core_dir.join("progress.md"),
            progress_phase_file: core_dir.join("progress-phase.md"),
            active_task_file: core_dir.join("active-task.md"),
            action_log_file: core_dir.join("action-log.md"),
            task_breakdown_file,
            improvement_file: core_dir.join("improvement-suggestions.md"),
            dependency_file: core_dir.join("new-dependencies.md"),
            approach_file: core_dir.join("current-task-approach.md"),
            task_log_file: core_dir.join("task-implementation-log.md"),
            task_history_file: core_dir.join("task-history-log.md"),
            archive_dir,
            templates_dir,
            root,
        }
    }

    /// Path for a document role.
    pub fn for_role(&self, role: DocumentRole) -> &Path {
        match role {
            DocumentRole::Progress => &self.progress_file,
            DocumentRole::ProgressPhase => &self.progress_phase_file,
            DocumentRole::ActiveTask => &self.active_task_file,
            DocumentRole::ActionLog => &self.action_log_file,
            DocumentRole::TaskBreakdown => &self.task_breakdown_file,
            DocumentRole::ImprovementLog => &self.improvement_file,
            DocumentRole::DependencyLog => &self.dependency_file,
            DocumentRole::Approach => &self.approach_file,
            DocumentRole::TaskLog => &self.task_log_file,
            DocumentRole::TaskHistory => &self.task_history_file,
        }
    }

    /// Path of an override template for a state file, if one exists on disk.
    pub fn template_override(&self, name: &str) -> Option<PathBuf> {
        let path = self.templates_dir.join(name);
        path.exists().then_some(path)
    }
}
