//! Status state machines
//!
//! Element statuses and phase stages are closed enumerations with one
//! authoritative mapping table to checkbox glyphs and display strings.
//! Element-status to glyph is total and fail-open; phase-stage parsing is
//! strict and rejected before any write.

use crate::error::{EngineError, EngineResult};

/// Status of a single tracked element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementStatus {
    NotStarted,
    InProgress,
    UnitTesting,
    Complete,
    CompleteUnitTestSuccessful,
    CompleteUnitTestIncomplete,
    Abandoned,
}

impl ElementStatus {
    pub const ALL: [ElementStatus; 7] = [
        ElementStatus::NotStarted,
        ElementStatus::InProgress,
        ElementStatus::UnitTesting,
        ElementStatus::Complete,
        ElementStatus::CompleteUnitTestSuccessful,
        ElementStatus::CompleteUnitTestIncomplete,
        ElementStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementStatus::NotStarted => "Not Started",
            ElementStatus::InProgress => "In Progress",
            ElementStatus::UnitTesting => "Unit Testing",
            ElementStatus::Complete => "Complete",
            ElementStatus::CompleteUnitTestSuccessful => "Complete - Unit Test Successful",
            ElementStatus::CompleteUnitTestIncomplete => "Complete - Unit Test Incomplete",
            ElementStatus::Abandoned => "Abandoned",
        }
    }

    /// Strict parse against the fixed set ("Completed" is accepted as an
    /// alias of Complete).
    pub fn parse(raw: &str) -> Option<ElementStatus> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("Completed") {
            return Some(ElementStatus::Complete);
        }
        ElementStatus::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }

    /// Checkbox glyph for this status.
    pub fn glyph(&self) -> &'static str {
        match self {
            ElementStatus::NotStarted => "[ ]",
            ElementStatus::InProgress => "[-]",
            ElementStatus::UnitTesting => "[y]",
            ElementStatus::Complete
            | ElementStatus::CompleteUnitTestSuccessful
            | ElementStatus::CompleteUnitTestIncomplete => "[x]",
            ElementStatus::Abandoned => "[a]",
        }
    }

    /// Whether this status counts as completed work.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            ElementStatus::Complete
                | ElementStatus::CompleteUnitTestSuccessful
                | ElementStatus::CompleteUnitTestIncomplete
        )
    }
}

/// Total, fail-open glyph mapping over raw status text. Unrecognized values
/// map to `[ ]` rather than failing.
pub fn glyph_for(raw: &str) -> &'static str {
    match ElementStatus::parse(raw) {
        Some(status) => status.glyph(),
        None => "[ ]",
    }
}

/// Phase-stage abbreviation. Only PREP, IMP, and VAL exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAbbr {
    Prep,
    Imp,
    Val,
}

impl PhaseAbbr {
    pub fn parse(raw: &str) -> EngineResult<PhaseAbbr> {
        match raw.trim() {
            "PREP" => Ok(PhaseAbbr::Prep),
            "IMP" => Ok(PhaseAbbr::Imp),
            "VAL" => Ok(PhaseAbbr::Val),
            other => Err(EngineError::Validation(format!(
                "invalid phase abbreviation: {other}. Must be one of: PREP, IMP, or VAL"
            ))),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseAbbr::Prep => "Preparation Phase",
            PhaseAbbr::Imp => "Implementation Phase",
            PhaseAbbr::Val => "Validation Phase",
        }
    }
}

/// Status of one phase stage for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    NotStarted,
    Active,
    Complete,
}

impl StageStatus {
    pub fn parse(raw: &str) -> EngineResult<StageStatus> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "not started" => Ok(StageStatus::NotStarted),
            "active" => Ok(StageStatus::Active),
            "complete" => Ok(StageStatus::Complete),
            other => Err(EngineError::Validation(format!(
                "invalid status: {other}. Must be one of: not started, active, or complete"
            ))),
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            StageStatus::NotStarted => "[ ]",
            StageStatus::Active => "[-]",
            StageStatus::Complete => "[x]",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::NotStarted => "not started",
            StageStatus::Active => "active",
            StageStatus::Complete => "complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_mapping_is_total() {
        for status in ElementStatus::ALL {
            let glyph = status.glyph();
            assert!(["[ ]", "[x]", "[-]", "[y]", "[a]"].contains(&glyph));
        }
    }

    #[test]
    fn test_glyph_for_known_statuses() {
        assert_eq!(glyph_for("Not Started"), "[ ]");
        assert_eq!(glyph_for("In Progress"), "[-]");
        assert_eq!(glyph_for("Unit Testing"), "[y]");
        assert_eq!(glyph_for("Complete"), "[x]");
        assert_eq!(glyph_for("Completed"), "[x]");
        assert_eq!(glyph_for("Complete - Unit Test Successful"), "[x]");
        assert_eq!(glyph_for("Complete - Unit Test Incomplete"), "[x]");
        assert_eq!(glyph_for("Abandoned"), "[a]");
    }

    #[test]
    fn test_glyph_for_unrecognized_fails_open() {
        assert_eq!(glyph_for("Blocked"), "[ ]");
        assert_eq!(glyph_for(""), "[ ]");
    }

    #[test]
    fn test_phase_abbr_strict() {
        assert_eq!(PhaseAbbr::parse("PREP").unwrap(), PhaseAbbr::Prep);
        assert_eq!(PhaseAbbr::parse("VAL").unwrap().display_name(), "Validation Phase");
        assert!(PhaseAbbr::parse("prep").is_err());
        assert!(PhaseAbbr::parse("TEST").is_err());
    }

    #[test]
    fn test_stage_status_parse() {
        assert_eq!(StageStatus::parse("Active").unwrap(), StageStatus::Active);
        assert_eq!(StageStatus::parse("not started").unwrap().glyph(), "[ ]");
        assert!(matches!(
            StageStatus::parse("done"),
            Err(EngineError::Validation(_))
        ));
    }
}
