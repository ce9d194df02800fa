//! Error types for scorebench

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Voice {voice_id} has no interval events to duplicate")]
    EmptyVoice { voice_id: String },
    #[error("No voices found to duplicate")]
    NoVoices,
    #[error("Tick overflow: {tick} + {offset} exceeds u32")]
    TickOverflow { tick: u32, offset: u32 },
    #[error("Score has no resolution field to derive a measure width from")]
    MissingResolution,
    #[error("Score has no time signature at tick {0}")]
    MissingTimeSignature(u32),
    #[error("Invalid time model: {0}")]
    InvalidTimeModel(String),
    #[error("Staff {staff} has an empty pitch sequence")]
    EmptyPitchSequence { staff: String },
    #[error("duration_ticks must be greater than 0")]
    ZeroDuration,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
