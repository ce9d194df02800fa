//! Interval events (notes) and structural events

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::time::Tick;

/// MIDI-style pitch (60 = middle C), serialized as `{"value": N}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub value: u8,
}

impl Pitch {
    pub fn new(value: u8) -> Self {
        Self { value }
    }
}

/// Tempo in beats per minute, serialized as `{"value": N}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bpm {
    pub value: u16,
}

impl Bpm {
    pub fn new(value: u16) -> Self {
        Self { value }
    }
}

/// Enharmonic spelling, e.g. D# (`step: 'D', alter: 1`) vs Eb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSpelling {
    pub step: char,
    pub alter: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteBeamType {
    Begin,
    Continue,
    End,
    ForwardHook,
    BackwardHook,
}

/// Beam state of a note at one beam level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBeamData {
    /// 1 = eighth, 2 = sixteenth, ...
    pub number: u8,
    pub beam_type: NoteBeamType,
}

/// A single note event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalEvent {
    pub id: String,
    pub start_tick: Tick,
    pub duration_ticks: u32,
    pub pitch: Pitch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling: Option<NoteSpelling>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beams: Vec<NoteBeamData>,
    /// Fields this model does not know about, kept so they round-trip
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IntervalEvent {
    pub fn new(
        id: impl Into<String>,
        start_tick: Tick,
        duration_ticks: u32,
        pitch: Pitch,
    ) -> Result<Self> {
        if duration_ticks == 0 {
            return Err(ScoreError::ZeroDuration);
        }
        Ok(Self {
            id: id.into(),
            start_tick,
            duration_ticks,
            pitch,
            spelling: None,
            beams: Vec::new(),
            extra: serde_json::Map::new(),
        })
    }

    pub fn with_spelling(mut self, spelling: NoteSpelling) -> Self {
        self.spelling = Some(spelling);
        self
    }

    pub fn with_beams(mut self, beams: Vec<NoteBeamData>) -> Self {
        self.beams = beams;
        self
    }

    /// End tick (start + duration)
    pub fn end_tick(&self) -> Tick {
        Tick::new(self.start_tick.value.saturating_add(self.duration_ticks))
    }

    /// Copy of this event moved `offset` ticks later
    pub fn shifted(&self, offset: u32) -> Result<Self> {
        let mut copy = self.clone();
        copy.start_tick = self.start_tick.checked_add(offset)?;
        Ok(copy)
    }
}

/// Musical clef types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clef {
    Treble,
    Bass,
    Alto,
    Tenor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoEvent {
    pub tick: Tick,
    pub bpm: Bpm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignatureEvent {
    pub tick: Tick,
    pub numerator: u8,
    pub denominator: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClefEvent {
    pub tick: Tick,
    pub clef: Clef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignatureEvent {
    pub tick: Tick,
    /// Sharps (positive) or flats (negative)
    pub fifths: i8,
}

/// Events that apply to the whole score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalStructuralEvent {
    Tempo(TempoEvent),
    TimeSignature(TimeSignatureEvent),
}

impl GlobalStructuralEvent {
    pub fn tempo(tick: Tick, bpm: u16) -> Self {
        Self::Tempo(TempoEvent { tick, bpm: Bpm::new(bpm) })
    }

    pub fn time_signature(tick: Tick, numerator: u8, denominator: u8) -> Self {
        Self::TimeSignature(TimeSignatureEvent { tick, numerator, denominator })
    }

    pub fn tick(&self) -> Tick {
        match self {
            Self::Tempo(e) => e.tick,
            Self::TimeSignature(e) => e.tick,
        }
    }
}

/// Events scoped to one staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffStructuralEvent {
    Clef(ClefEvent),
    KeySignature(KeySignatureEvent),
}

impl StaffStructuralEvent {
    pub fn clef(tick: Tick, clef: Clef) -> Self {
        Self::Clef(ClefEvent { tick, clef })
    }

    pub fn key_signature(tick: Tick, fifths: i8) -> Self {
        Self::KeySignature(KeySignatureEvent { tick, fifths })
    }

    pub fn tick(&self) -> Tick {
        match self {
            Self::Clef(e) => e.tick,
            Self::KeySignature(e) => e.tick,
        }
    }
}
