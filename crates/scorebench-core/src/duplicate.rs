//! Offset duplication: grows a score by appending a tick-shifted copy of
//! every voice's notes.
//!
//! For each voice, `offset = max(start_tick) + measure_width`, and every
//! original note is appended again at `start_tick + offset`. Each voice uses
//! its own maximum, so voices of different lengths get different offsets.
//! All copies are computed before anything is appended; on error the
//! document is left untouched.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};
use crate::events::IntervalEvent;
use crate::ids::shifted_id;
use crate::score::{Instrument, Score, Staff, Voice};
use crate::time::Tick;

/// What duplicated notes use as their identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Derive a fresh id from the original id and the offset
    #[default]
    Mint,
    /// Copy the original id; original and copy then share it
    Preserve,
}

/// Where the gap between the original content and its copy comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureGap {
    /// Caller-supplied width in ticks
    Fixed(u32),
    /// Width of the measure in effect at the voice's last note, from the
    /// score's `resolution` and time signature
    FromDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOptions {
    pub gap: MeasureGap,
    pub ids: IdPolicy,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            gap: MeasureGap::FromDocument,
            ids: IdPolicy::Mint,
        }
    }
}

/// Outcome of one duplication pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicationReport {
    pub voices_duplicated: usize,
    pub events_appended: usize,
    /// (voice id, offset applied)
    pub offsets: Vec<(String, u32)>,
    /// Staves that had no voices
    pub empty_staves: Vec<String>,
    /// Instruments that had no staves
    pub empty_instruments: Vec<String>,
}

struct VoicePlan {
    voice_id: String,
    offset: u32,
    copies: Vec<IntervalEvent>,
}

fn plan_voice(
    voice: &Voice,
    measure_width: impl Fn(Tick) -> Result<u32>,
    ids: IdPolicy,
) -> Result<VoicePlan> {
    let max_tick = voice
        .max_start_tick()
        .ok_or_else(|| ScoreError::EmptyVoice { voice_id: voice.id.clone() })?;
    let offset = max_tick.checked_add(measure_width(max_tick)?)?.value;

    let copies = voice
        .interval_events
        .iter()
        .map(|event| {
            let mut copy = event.shifted(offset)?;
            if ids == IdPolicy::Mint {
                copy.id = shifted_id(&event.id, offset);
            }
            Ok(copy)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VoicePlan {
        voice_id: voice.id.clone(),
        offset,
        copies,
    })
}

fn plan_staves<'a>(
    staves: impl Iterator<Item = &'a Staff>,
    measure_width: &impl Fn(Tick) -> Result<u32>,
    ids: IdPolicy,
    report: &mut DuplicationReport,
) -> Result<Vec<VoicePlan>> {
    let mut plans = Vec::new();
    for staff in staves {
        if staff.voices.is_empty() {
            tracing::warn!(staff = %staff.id, "Staff has no voices to duplicate");
            report.empty_staves.push(staff.id.clone());
        }
        for voice in &staff.voices {
            plans.push(plan_voice(voice, measure_width, ids)?);
        }
    }
    if plans.is_empty() {
        return Err(ScoreError::NoVoices);
    }
    Ok(plans)
}

fn apply<'a>(
    voices: impl Iterator<Item = &'a mut Voice>,
    plans: Vec<VoicePlan>,
    mut report: DuplicationReport,
) -> DuplicationReport {
    for (voice, plan) in voices.zip(plans) {
        tracing::debug!(
            voice = %plan.voice_id,
            offset = plan.offset,
            appended = plan.copies.len(),
            "Duplicated voice"
        );
        report.events_appended += plan.copies.len();
        report.voices_duplicated += 1;
        report.offsets.push((plan.voice_id, plan.offset));
        voice.interval_events.extend(plan.copies);
    }
    report
}

/// Duplicate one voice, returning the offset applied
pub fn duplicate_voice(voice: &mut Voice, measure_width: u32, ids: IdPolicy) -> Result<u32> {
    let plan = plan_voice(voice, |_: Tick| Ok(measure_width), ids)?;
    let offset = plan.offset;
    voice.interval_events.extend(plan.copies);
    Ok(offset)
}

/// Duplicate every voice of one staff
pub fn duplicate_staff(
    staff: &mut Staff,
    measure_width: u32,
    ids: IdPolicy,
) -> Result<DuplicationReport> {
    let mut report = DuplicationReport::default();
    let width = |_: Tick| -> Result<u32> { Ok(measure_width) };
    let plans = plan_staves(std::iter::once(&*staff), &width, ids, &mut report)?;
    Ok(apply(staff.voices.iter_mut(), plans, report))
}

/// Duplicate every voice of every staff of one instrument
pub fn duplicate_instrument(
    instrument: &mut Instrument,
    measure_width: u32,
    ids: IdPolicy,
) -> Result<DuplicationReport> {
    let mut report = DuplicationReport::default();
    if instrument.staves.is_empty() {
        report.empty_instruments.push(instrument.id.clone());
    }
    let width = |_: Tick| -> Result<u32> { Ok(measure_width) };
    let plans = plan_staves(instrument.staves.iter(), &width, ids, &mut report)?;
    let voices = instrument.staves.iter_mut().flat_map(|s| s.voices.iter_mut());
    Ok(apply(voices, plans, report))
}

/// Duplicate every voice in the score.
///
/// Missing structure above the voice level is tolerated: instruments without
/// staves and staves without voices are listed in the report, logged, and
/// skipped. A voice is different. A voice with no notes, including one whose
/// `interval_events` key is absent from the JSON, fails with
/// [`ScoreError::EmptyVoice`] because its offset is undefined. Either way
/// nothing is appended unless every voice can be planned.
pub fn duplicate_score(
    score: &mut Score,
    options: &DuplicateOptions,
) -> Result<DuplicationReport> {
    let mut report = DuplicationReport::default();
    for instrument in score.instruments.iter().filter(|i| i.staves.is_empty()) {
        tracing::warn!(instrument = %instrument.id, "Instrument has no staves to duplicate");
        report.empty_instruments.push(instrument.id.clone());
    }

    let plans = {
        let doc: &Score = score;
        let measure_width = |tick: Tick| -> Result<u32> {
            match options.gap {
                MeasureGap::Fixed(width) => Ok(width),
                MeasureGap::FromDocument => Ok(doc.time_model_at(tick)?.ticks_per_measure()),
            }
        };
        let staves = doc.instruments.iter().flat_map(|i| i.staves.iter());
        plan_staves(staves, &measure_width, options.ids, &mut report)?
    };

    let report = apply(score.voices_mut(), plans, report);
    tracing::info!(
        score = %score.id,
        voices = report.voices_duplicated,
        appended = report.events_appended,
        "Duplicated score"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{
        Clef, GlobalStructuralEvent, NoteBeamData, NoteBeamType, NoteSpelling, Pitch,
        StaffStructuralEvent,
    };
    use crate::synth::{synthesize, PatternParams};
    use std::collections::HashSet;

    fn voice_with_ticks(id: &str, ticks: &[u32]) -> Voice {
        let mut voice = Voice::new(id);
        for (i, &tick) in ticks.iter().enumerate() {
            let pitch = Pitch::new(60 + i as u8);
            let note = IntervalEvent::new(format!("{id}-n{i}"), Tick::new(tick), 480, pitch);
            voice.push(note.unwrap());
        }
        voice
    }

    fn ticks(voice: &Voice) -> Vec<u32> {
        voice.interval_events.iter().map(|e| e.start_tick.value).collect()
    }

    fn two_voice_score() -> Score {
        let mut score = Score::new("s");
        score.resolution = Some(960);
        score.add_global_event(GlobalStructuralEvent::time_signature(Tick::ZERO, 4, 4));
        let mut instrument = Instrument::new("i", "Piano", "piano");
        let mut staff = Staff::new("st");
        staff.add_structural_event(StaffStructuralEvent::clef(Tick::ZERO, Clef::Treble));
        staff.add_voice(voice_with_ticks("long", &[0, 480, 960, 7680]));
        staff.add_voice(voice_with_ticks("short", &[0, 480]));
        instrument.add_staff(staff);
        score.add_instrument(instrument);
        score
    }

    #[test]
    fn test_offset_after_last_start() {
        let mut voice = voice_with_ticks("v", &[0, 480, 960]);
        let offset = duplicate_voice(&mut voice, 7680, IdPolicy::Preserve).unwrap();

        assert_eq!(offset, 8640);
        assert_eq!(voice.interval_events.len(), 6);
        assert_eq!(ticks(&voice), vec![0, 480, 960, 8640, 9120, 9600]);
    }

    #[test]
    fn test_copies_mirror_originals() {
        // Unsorted originals: the maximum, not the last element, drives the offset
        let mut voice = voice_with_ticks("v", &[960, 0, 480]);
        let original = voice.interval_events.clone();
        let offset = duplicate_voice(&mut voice, 3840, IdPolicy::Preserve).unwrap();
        assert_eq!(offset, 4800);

        let (head, tail) = voice.interval_events.split_at(3);
        assert_eq!(head, original.as_slice());
        for (orig, copy) in original.iter().zip(tail) {
            assert_eq!(copy.start_tick.value, orig.start_tick.value + offset);
            assert_eq!(copy.pitch, orig.pitch);
            assert_eq!(copy.duration_ticks, orig.duration_ticks);
            assert_eq!(copy.id, orig.id);
        }
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let mut voice = voice_with_ticks("v", &[0, 480, 960]);
        duplicate_voice(&mut voice, 7680, IdPolicy::Mint).unwrap();
        duplicate_voice(&mut voice, 7680, IdPolicy::Mint).unwrap();

        assert_eq!(voice.interval_events.len(), 12);
        let ids: HashSet<_> = voice.interval_events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 12);
        assert_eq!(voice.interval_events[3].id, "v-n0+8640");
    }

    #[test]
    fn test_empty_voice_is_an_error() {
        let mut voice = Voice::new("empty");
        let err = duplicate_voice(&mut voice, 7680, IdPolicy::Mint).unwrap_err();
        assert!(matches!(err, ScoreError::EmptyVoice { voice_id } if voice_id == "empty"));
        assert!(voice.is_empty());
    }

    #[test]
    fn test_empty_voice_leaves_score_untouched() {
        let mut score = two_voice_score();
        score.instruments[0].staves[0].add_voice(Voice::new("silent"));
        let before = score.clone();

        let err = duplicate_score(&mut score, &DuplicateOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreError::EmptyVoice { .. }));
        assert_eq!(score, before);
    }

    #[test]
    fn test_voices_use_their_own_offsets() {
        let mut score = two_voice_score();
        let options = DuplicateOptions { gap: MeasureGap::Fixed(3840), ids: IdPolicy::Mint };
        let report = duplicate_score(&mut score, &options).unwrap();

        assert_eq!(report.voices_duplicated, 2);
        assert_eq!(report.events_appended, 6);
        assert_eq!(
            report.offsets,
            vec![("long".to_string(), 11_520), ("short".to_string(), 4320)]
        );

        let staff = &score.instruments[0].staves[0];
        assert_eq!(ticks(&staff.voices[1]), vec![0, 480, 4320, 4800]);
        assert_eq!(staff.staff_structural_events.len(), 1);
        assert_eq!(score.global_structural_events.len(), 1);
    }

    #[test]
    fn test_gap_from_document() {
        let mut score = two_voice_score();
        duplicate_score(&mut score, &DuplicateOptions::default()).unwrap();
        // 960 PPQ in 4/4: one measure is 3840 ticks
        assert_eq!(ticks(&score.instruments[0].staves[0].voices[1])[2], 480 + 3840);

        let mut bare = two_voice_score();
        bare.resolution = None;
        assert!(matches!(
            duplicate_score(&mut bare, &DuplicateOptions::default()),
            Err(ScoreError::MissingResolution)
        ));
    }

    #[test]
    fn test_missing_substructure_reported() {
        let mut score = two_voice_score();
        score.add_instrument(Instrument::new("bare", "Flute", "flute"));
        score.instruments[0].add_staff(Staff::new("voiceless"));

        let report = duplicate_score(&mut score, &DuplicateOptions::default()).unwrap();
        assert_eq!(report.empty_instruments, vec!["bare".to_string()]);
        assert_eq!(report.empty_staves, vec!["voiceless".to_string()]);

        let mut hollow = Score::new("hollow");
        assert!(matches!(
            duplicate_score(&mut hollow, &DuplicateOptions::default()),
            Err(ScoreError::NoVoices)
        ));
    }

    #[test]
    fn test_staff_and_instrument_scope() {
        let mut score = two_voice_score();
        let report =
            duplicate_staff(&mut score.instruments[0].staves[0], 7680, IdPolicy::Mint).unwrap();
        assert_eq!(report.voices_duplicated, 2);

        let report = duplicate_instrument(&mut score.instruments[0], 7680, IdPolicy::Mint).unwrap();
        assert_eq!(report.events_appended, 12);
        assert_eq!(score.instruments[0].staves[0].voices[0].interval_events.len(), 16);
    }

    #[test]
    fn test_doubling_synthesized_fixture() {
        let mut params = PatternParams::dense_piano();
        params.measure_count = 50;
        let mut score = synthesize(&params).unwrap();
        let options = DuplicateOptions { gap: MeasureGap::Fixed(7680), ids: IdPolicy::Preserve };
        duplicate_score(&mut score, &options).unwrap();

        let treble = &score.instruments[0].staves[0].voices[0].interval_events;
        assert_eq!(treble.len(), 800);
        let max_tick = 49 * 3840 + 7 * 480;
        assert_eq!(treble[400].start_tick.value, max_tick + 7680);
        assert_eq!(treble[400].id, treble[0].id);
    }

    #[test]
    fn test_tick_overflow_is_reported() {
        let mut voice = voice_with_ticks("v", &[u32::MAX - 10]);
        assert!(matches!(
            duplicate_voice(&mut voice, 3840, IdPolicy::Mint),
            Err(ScoreError::TickOverflow { .. })
        ));
        assert_eq!(voice.interval_events.len(), 1);
    }

    #[test]
    fn test_annotations_survive_duplication() {
        let mut score = two_voice_score();
        let beams = vec![
            NoteBeamData { number: 1, beam_type: NoteBeamType::Begin },
            NoteBeamData { number: 2, beam_type: NoteBeamType::ForwardHook },
        ];
        let spelling = NoteSpelling { step: 'E', alter: -1 };
        {
            let note = &mut score.instruments[0].staves[0].voices[1].interval_events[0];
            note.spelling = Some(spelling);
            note.beams = beams.clone();
            note.extra.insert("stem".into(), serde_json::json!("down"));
        }

        duplicate_score(&mut score, &DuplicateOptions::default()).unwrap();
        let reparsed = Score::from_json_str(&score.to_json_pretty().unwrap()).unwrap();

        let short = &reparsed.instruments[0].staves[0].voices[1].interval_events;
        assert_eq!(short.len(), 4);
        for note in [&short[0], &short[2]] {
            assert_eq!(note.spelling, Some(spelling));
            assert_eq!(note.beams, beams);
            assert_eq!(note.extra["stem"], serde_json::json!("down"));
        }
        assert_eq!(short[2].start_tick.value, 480 + 3840);
        assert_eq!(short[3].spelling, None);
    }

    #[test]
    fn test_oversized_resolution_is_rejected() {
        let mut score = two_voice_score();
        score.resolution = Some(2_000_000_000);
        let before = score.clone();

        let err = duplicate_score(&mut score, &DuplicateOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidTimeModel(_)));
        assert_eq!(score, before);
    }

    #[test]
    fn test_voice_without_events_key_is_empty() {
        let doc = r#"{
            "id": "s",
            "resolution": 960,
            "global_structural_events": [
                {"TimeSignature": {"tick": {"value": 0}, "numerator": 4, "denominator": 4}}
            ],
            "instruments": [{
                "id": "i",
                "name": "Piano",
                "instrument_type": "piano",
                "staves": [
                    {"id": "no-voices"},
                    {"id": "st", "voices": [{"id": "hollow"}]}
                ]
            }]
        }"#;
        let mut score = Score::from_json_str(doc).unwrap();
        let before = score.clone();

        let err = duplicate_score(&mut score, &DuplicateOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreError::EmptyVoice { voice_id } if voice_id == "hollow"));
        assert_eq!(score, before);
    }
}
