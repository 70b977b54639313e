pub mod status;
pub mod task;
pub mod time;

pub use status::{glyph_for, ElementStatus, PhaseAbbr, StageStatus};
pub use task::{
    ActionLogEntry, ArchiveSnapshot, DependencyRecord, Element, ElementId, ImprovementRecord,
    Phase, Task,
};
pub use time::{entry_timestamp, file_timestamp};
