//! Service layer
//!
//! Engine operations over the workspace documents. Each function performs a
//! bounded read-modify-write sequence and returns a result the command layer
//! turns into user-facing messaging; non-fatal problems come back as warning
//! strings rather than errors.

pub mod actions;
pub mod archive;
pub mod progress;
pub mod records;
pub mod tasks;

pub use actions::{add_implementation_file, log_action, update_confidence};
pub use archive::{archive_file, reset_all};
pub use progress::{
    progress_summary, recompute_progress, update_element_status, update_phase_stage,
    ProgressSummary,
};
pub use records::{log_dependency, log_improvement};
pub use tasks::{start_task, StartOutcome};

/// Append an entry to the task implementation log, creating the file with a
/// minimal header when absent. Best-effort history; failures surface to the
/// caller as warnings, never as hard errors.
pub(crate) fn append_task_log(
    paths: &crate::config::WorkspacePaths,
    storage: &dyn crate::storage::Storage,
    task_id: &str,
    entry: &str,
) -> Result<(), crate::error::EngineError> {
    let path = &paths.task_log_file;
    if !storage.exists(path) {
        storage.write(
            path,
            "# Task Implementation Log\nThis file contains the complete implementation history of all tasks.\n",
        )?;
    }
    storage.append(path, &format!("\n## {task_id}\n{entry}\n"))
}
