//! scorebench-core: Score document model and fixture generators

pub mod duplicate;
mod error;
mod events;
mod ids;
mod score;
pub mod stats;
pub mod synth;
mod time;

pub use duplicate::{
    duplicate_instrument, duplicate_score, duplicate_staff, duplicate_voice,
    DuplicateOptions, DuplicationReport, IdPolicy, MeasureGap,
};
pub use error::{Result, ScoreError};
pub use events::{
    Bpm, Clef, ClefEvent, GlobalStructuralEvent, IntervalEvent, KeySignatureEvent, NoteBeamData,
    NoteBeamType, NoteSpelling, Pitch, StaffStructuralEvent, TempoEvent, TimeSignatureEvent,
};
pub use ids::{shifted_id, IdGenerator};
pub use score::{Instrument, Score, Staff, Voice};
pub use stats::{ScoreStats, StaffStats};
pub use synth::{synthesize, PatternParams, StaffPattern};
pub use time::{Tick, TimeModel, DEFAULT_RESOLUTION};
