//! Score document hierarchy: score -> instruments -> staves -> voices

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::events::{
    ClefEvent, GlobalStructuralEvent, IntervalEvent, KeySignatureEvent, StaffStructuralEvent,
    TempoEvent, TimeSignatureEvent,
};
use crate::time::{Tick, TimeModel};

/// An ordered line of notes within a staff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    #[serde(default)]
    pub interval_events: Vec<IntervalEvent>,
}

impl Voice {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            interval_events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: IntervalEvent) {
        self.interval_events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.interval_events.is_empty()
    }

    /// Latest start tick, `None` for an empty voice
    pub fn max_start_tick(&self) -> Option<Tick> {
        self.interval_events.iter().map(|e| e.start_tick).max()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    #[serde(default)]
    pub staff_structural_events: Vec<StaffStructuralEvent>,
    #[serde(default)]
    pub voices: Vec<Voice>,
}

impl Staff {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            staff_structural_events: Vec::new(),
            voices: Vec::new(),
        }
    }

    /// Appends without deduplicating events at the same tick
    pub fn add_structural_event(&mut self, event: StaffStructuralEvent) {
        self.staff_structural_events.push(event);
    }

    pub fn add_voice(&mut self, voice: Voice) {
        self.voices.push(voice);
    }

    /// Structural events by tick; equal ticks keep insertion order
    pub fn sorted_structural_events(&self) -> Vec<&StaffStructuralEvent> {
        let mut events: Vec<_> = self.staff_structural_events.iter().collect();
        events.sort_by_key(|e| e.tick());
        events
    }

    /// Clef in effect at `tick`
    pub fn clef_at(&self, tick: Tick) -> Option<&ClefEvent> {
        self.sorted_structural_events()
            .into_iter()
            .filter_map(|e| match e {
                StaffStructuralEvent::Clef(c) if c.tick <= tick => Some(c),
                _ => None,
            })
            .last()
    }

    /// Key signature in effect at `tick`
    pub fn key_signature_at(&self, tick: Tick) -> Option<&KeySignatureEvent> {
        self.sorted_structural_events()
            .into_iter()
            .filter_map(|e| match e {
                StaffStructuralEvent::KeySignature(k) if k.tick <= tick => Some(k),
                _ => None,
            })
            .last()
    }

    pub fn note_count(&self) -> usize {
        self.voices.iter().map(|v| v.interval_events.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    /// Free-form playback type, e.g. "piano"
    pub instrument_type: String,
    #[serde(default)]
    pub staves: Vec<Staff>,
}

impl Instrument {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        instrument_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instrument_type: instrument_type.into(),
            staves: Vec::new(),
        }
    }

    pub fn add_staff(&mut self, staff: Staff) {
        self.staves.push(staff);
    }

    pub fn get_staff(&self, id: &str) -> Option<&Staff> {
        self.staves.iter().find(|s| s.id == id)
    }

    pub fn get_staff_mut(&mut self, id: &str) -> Option<&mut Staff> {
        self.staves.iter_mut().find(|s| s.id == id)
    }
}

/// Root of a score document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    /// Ticks per quarter note. Optional on the wire; documents written
    /// without it stay byte-compatible with older consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,
    #[serde(default)]
    pub global_structural_events: Vec<GlobalStructuralEvent>,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

impl Score {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Two-space indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Appends without deduplicating events at the same tick
    pub fn add_global_event(&mut self, event: GlobalStructuralEvent) {
        self.global_structural_events.push(event);
    }

    pub fn add_instrument(&mut self, instrument: Instrument) {
        self.instruments.push(instrument);
    }

    pub fn get_instrument(&self, id: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.id == id)
    }

    /// Global events by tick; equal ticks keep insertion order
    pub fn sorted_global_events(&self) -> Vec<&GlobalStructuralEvent> {
        let mut events: Vec<_> = self.global_structural_events.iter().collect();
        events.sort_by_key(|e| e.tick());
        events
    }

    /// Tempo in effect at `tick`
    pub fn tempo_at(&self, tick: Tick) -> Option<&TempoEvent> {
        self.sorted_global_events()
            .into_iter()
            .filter_map(|e| match e {
                GlobalStructuralEvent::Tempo(t) if t.tick <= tick => Some(t),
                _ => None,
            })
            .last()
    }

    /// Time signature in effect at `tick`
    pub fn time_signature_at(&self, tick: Tick) -> Option<&TimeSignatureEvent> {
        self.sorted_global_events()
            .into_iter()
            .filter_map(|e| match e {
                GlobalStructuralEvent::TimeSignature(t) if t.tick <= tick => Some(t),
                _ => None,
            })
            .last()
    }

    /// Time model from the stored resolution and the meter at `tick`
    pub fn time_model_at(&self, tick: Tick) -> Result<TimeModel> {
        let resolution = self.resolution.ok_or(ScoreError::MissingResolution)?;
        let sig = self
            .time_signature_at(tick)
            .ok_or(ScoreError::MissingTimeSignature(tick.value))?;
        TimeModel::new(resolution, sig.numerator, sig.denominator)
    }

    /// All voices, depth first
    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.instruments
            .iter()
            .flat_map(|i| i.staves.iter())
            .flat_map(|s| s.voices.iter())
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.instruments
            .iter_mut()
            .flat_map(|i| i.staves.iter_mut())
            .flat_map(|s| s.voices.iter_mut())
    }

    pub fn note_count(&self) -> usize {
        self.voices().map(|v| v.interval_events.len()).sum()
    }
}
