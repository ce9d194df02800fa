//! Pattern synthesis: builds a complete score from periodic per-staff
//! pitch sequences.
//!
//! Each staff gets `measure_count * notes_per_measure` notes. Note `j` of
//! measure `m` starts at `m * ticks_per_measure + j * note_duration` and
//! takes `pitches[j % pitches.len()]`. Identical parameters always produce
//! identical documents.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::events::{Clef, GlobalStructuralEvent, IntervalEvent, Pitch, StaffStructuralEvent};
use crate::ids::IdGenerator;
use crate::score::{Instrument, Score, Staff, Voice};
use crate::time::{Tick, TimeModel};

/// Pattern and identity seeds for one staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffPattern {
    pub staff_id: String,
    pub voice_id: String,
    pub clef: Clef,
    /// Key signature as sharps (positive) or flats (negative)
    pub fifths: i8,
    /// Cycled once per measure
    pub pitches: Vec<u8>,
    /// Note id source; cloned per synthesis call
    pub ids: IdGenerator,
}

/// Everything the synthesizer needs to build a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternParams {
    pub score_id: String,
    pub instrument_id: String,
    pub instrument_name: String,
    pub instrument_type: String,
    pub time: TimeModel,
    pub tempo_bpm: u16,
    pub measure_count: u32,
    pub ticks_per_measure: u32,
    pub note_duration: u32,
    pub notes_per_measure: u32,
    pub staves: Vec<StaffPattern>,
}

const DENSE_ID_SUFFIX: &str = "-8400-e29b-41d4-a716-446655440000";

impl PatternParams {
    /// Empty single-instrument shell using the geometry of `time`
    pub fn new(time: TimeModel) -> Self {
        Self {
            score_id: "score".into(),
            instrument_id: "instrument".into(),
            instrument_name: "Piano".into(),
            instrument_type: "piano".into(),
            time,
            tempo_bpm: 120,
            measure_count: 0,
            ticks_per_measure: time.ticks_per_measure(),
            note_duration: time.ticks_for_division(8),
            notes_per_measure: 0,
            staves: Vec::new(),
        }
    }

    /// Two-hand piano in eighth notes: 30 measures of 4/4 at 960 PPQ,
    /// C major scale runs in treble (C4..C5) and bass (C3..C4).
    pub fn dense_piano() -> Self {
        let time = TimeModel::common_time(960);
        Self {
            score_id: "aa0e8400-e29b-41d4-a716-446655440000".into(),
            instrument_id: "bb0e8400-e29b-41d4-a716-446655440001".into(),
            measure_count: 30,
            notes_per_measure: 8,
            staves: vec![
                StaffPattern {
                    staff_id: "cc0e8400-e29b-41d4-a716-446655440002".into(),
                    voice_id: "ee0e8400-e29b-41d4-a716-446655440004".into(),
                    clef: Clef::Treble,
                    fifths: 0,
                    pitches: vec![60, 62, 64, 65, 67, 69, 71, 72],
                    ids: IdGenerator::new("tn", 10).with_suffix(DENSE_ID_SUFFIX),
                },
                StaffPattern {
                    staff_id: "dd0e8400-e29b-41d4-a716-446655440003".into(),
                    voice_id: "ff0e8400-e29b-41d4-a716-446655440005".into(),
                    clef: Clef::Bass,
                    fifths: 0,
                    pitches: vec![48, 50, 52, 53, 55, 57, 59, 60],
                    ids: IdGenerator::new("bn", 10000).with_suffix(DENSE_ID_SUFFIX),
                },
            ],
            ..Self::new(time)
        }
    }

    /// Ticks covered by the synthesized content
    pub fn total_ticks(&self) -> u64 {
        self.measure_count as u64 * self.ticks_per_measure as u64
    }

    fn start_tick(&self, measure_index: u32, note_index: u32) -> Result<Tick> {
        let overflow = || ScoreError::TickOverflow {
            tick: measure_index.saturating_mul(self.ticks_per_measure),
            offset: note_index.saturating_mul(self.note_duration),
        };
        let measure_start = measure_index
            .checked_mul(self.ticks_per_measure)
            .ok_or_else(overflow)?;
        let within = note_index.checked_mul(self.note_duration).ok_or_else(overflow)?;
        Tick::new(measure_start).checked_add(within)
    }
}

/// Build a fresh score from `params`.
///
/// `ticks_per_measure` must agree with `time`, since the document stores
/// `time` as its resolution and meter.
pub fn synthesize(params: &PatternParams) -> Result<Score> {
    let time = TimeModel::new(
        params.time.resolution,
        params.time.numerator,
        params.time.denominator,
    )?;
    if params.ticks_per_measure != time.ticks_per_measure() {
        return Err(ScoreError::InvalidTimeModel(format!(
            "ticks_per_measure {} does not match {}/{} at resolution {} ({} ticks)",
            params.ticks_per_measure,
            time.numerator,
            time.denominator,
            time.resolution,
            time.ticks_per_measure()
        )));
    }

    let mut score = Score::new(params.score_id.clone());
    score.resolution = Some(params.time.resolution);
    score.add_global_event(GlobalStructuralEvent::tempo(Tick::ZERO, params.tempo_bpm));
    score.add_global_event(GlobalStructuralEvent::time_signature(
        Tick::ZERO,
        params.time.numerator,
        params.time.denominator,
    ));

    let mut instrument = Instrument::new(
        params.instrument_id.clone(),
        params.instrument_name.clone(),
        params.instrument_type.clone(),
    );

    for pattern in &params.staves {
        instrument.add_staff(synthesize_staff(params, pattern)?);
    }

    score.add_instrument(instrument);

    tracing::info!(
        score = %score.id,
        staves = params.staves.len(),
        notes = score.note_count(),
        ticks = params.total_ticks(),
        "Synthesized score"
    );

    Ok(score)
}

fn synthesize_staff(params: &PatternParams, pattern: &StaffPattern) -> Result<Staff> {
    let mut staff = Staff::new(pattern.staff_id.clone());
    staff.add_structural_event(StaffStructuralEvent::clef(Tick::ZERO, pattern.clef));
    staff.add_structural_event(StaffStructuralEvent::key_signature(Tick::ZERO, pattern.fifths));

    let mut voice = Voice::new(pattern.voice_id.clone());
    let produces_notes = params.measure_count > 0 && params.notes_per_measure > 0;

    if produces_notes && pattern.pitches.is_empty() {
        return Err(ScoreError::EmptyPitchSequence { staff: pattern.staff_id.clone() });
    }

    let mut ids = pattern.ids.clone();
    voice
        .interval_events
        .reserve(params.measure_count as usize * params.notes_per_measure as usize);

    for measure_index in 0..params.measure_count {
        for note_index in 0..params.notes_per_measure {
            let pitch = pattern.pitches[note_index as usize % pattern.pitches.len()];
            voice.push(IntervalEvent::new(
                ids.next_id(),
                params.start_tick(measure_index, note_index)?,
                params.note_duration,
                Pitch::new(pitch),
            )?);
        }
    }

    tracing::debug!(staff = %staff.id, notes = voice.interval_events.len(), "Synthesized staff");

    staff.add_voice(voice);
    Ok(staff)
}
