//! Summary statistics for generated fixtures

use std::collections::HashSet;
use std::fmt;

use crate::score::Score;
use crate::time::Tick;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffStats {
    pub staff_id: String,
    pub notes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreStats {
    pub staves: Vec<StaffStats>,
    pub total_notes: usize,
    /// Latest end tick across all notes
    pub span_ticks: u32,
    /// Measures covered by the span, when the score carries a resolution
    pub measures: Option<u32>,
    /// Notes whose id is already used by an earlier note
    pub duplicate_ids: usize,
}

impl ScoreStats {
    pub fn collect(score: &Score) -> Self {
        let staves: Vec<StaffStats> = score
            .instruments
            .iter()
            .flat_map(|i| i.staves.iter())
            .map(|s| StaffStats {
                staff_id: s.id.clone(),
                notes: s.note_count(),
            })
            .collect();

        let span_ticks = score
            .voices()
            .flat_map(|v| v.interval_events.iter())
            .map(|e| e.end_tick().value)
            .max()
            .unwrap_or(0);

        let measures = score.time_model_at(Tick::ZERO).ok().map(|time| {
            span_ticks.div_ceil(time.ticks_per_measure())
        });

        let mut seen = HashSet::new();
        let duplicate_ids = score
            .voices()
            .flat_map(|v| v.interval_events.iter())
            .filter(|e| !seen.insert(e.id.as_str()))
            .count();

        Self {
            total_notes: staves.iter().map(|s| s.notes).sum(),
            staves,
            span_ticks,
            measures,
            duplicate_ids,
        }
    }
}

impl fmt::Display for ScoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(measures) = self.measures {
            writeln!(f, "  Measures: {measures}")?;
        }
        for staff in &self.staves {
            writeln!(f, "  Staff {}: {} notes", staff.staff_id, staff.notes)?;
        }
        writeln!(f, "  Total notes: {}", self.total_notes)?;
        write!(f, "  Duration: {} ticks", self.span_ticks)?;
        if self.duplicate_ids > 0 {
            write!(f, "\n  Shared identifiers: {}", self.duplicate_ids)?;
        }
        Ok(())
    }
}
