//! Tick arithmetic and measure geometry

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

/// Resolution used by the bundled fixtures (ticks per quarter note)
pub const DEFAULT_RESOLUTION: u32 = 960;

/// A position on the score timeline, serialized as `{"value": N}`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tick {
    pub value: u32,
}

impl Tick {
    pub const ZERO: Tick = Tick { value: 0 };

    pub fn new(value: u32) -> Self {
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Shift forward by `ticks`, failing instead of wrapping
    pub fn checked_add(&self, ticks: u32) -> Result<Self> {
        self.value
            .checked_add(ticks)
            .map(Self::new)
            .ok_or(ScoreError::TickOverflow { tick: self.value, offset: ticks })
    }
}

impl From<u32> for Tick {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// Resolution and meter that together fix the width of a measure.
///
/// Passed explicitly wherever tick geometry is needed so documents at
/// different resolutions can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeModel {
    /// Ticks per quarter note (PPQ)
    pub resolution: u32,
    /// Time signature numerator
    pub numerator: u8,
    /// Time signature denominator
    pub denominator: u8,
}

impl Default for TimeModel {
    fn default() -> Self {
        Self::common_time(DEFAULT_RESOLUTION)
    }
}

impl TimeModel {
    pub fn new(resolution: u32, numerator: u8, denominator: u8) -> Result<Self> {
        if resolution == 0 {
            return Err(ScoreError::InvalidTimeModel("resolution must be greater than 0".into()));
        }
        if numerator == 0 || denominator == 0 {
            return Err(ScoreError::InvalidTimeModel(format!(
                "time signature {numerator}/{denominator} has a zero component"
            )));
        }
        let time = Self { resolution, numerator, denominator };
        match time.checked_ticks_per_measure() {
            None => Err(ScoreError::InvalidTimeModel(format!(
                "{numerator}/{denominator} at resolution {resolution} overflows a measure"
            ))),
            Some(0) => Err(ScoreError::InvalidTimeModel(format!(
                "{numerator}/{denominator} at resolution {resolution} gives an empty measure"
            ))),
            Some(_) => Ok(time),
        }
    }

    /// 4/4 at the given resolution
    pub fn common_time(resolution: u32) -> Self {
        Self { resolution, numerator: 4, denominator: 4 }
    }

    /// Ticks spanned by one beat (one denominator unit)
    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_for_division(self.denominator as u32)
    }

    /// `resolution * 4 * numerator / denominator`, `None` on overflow or a
    /// zero denominator
    pub fn checked_ticks_per_measure(&self) -> Option<u32> {
        self.resolution
            .checked_mul(4)?
            .checked_mul(self.numerator as u32)?
            .checked_div(self.denominator as u32)
    }

    /// `resolution * 4` in 4/4. Saturates for models `new` would reject.
    pub fn ticks_per_measure(&self) -> u32 {
        self.checked_ticks_per_measure().unwrap_or(u32::MAX)
    }

    /// Duration of a 1/`division` note (4 = quarter, 8 = eighth)
    pub fn ticks_for_division(&self, division: u32) -> u32 {
        self.resolution.saturating_mul(4) / division.max(1)
    }

    /// First tick of the measure at `index` (0-based)
    pub fn measure_start(&self, index: u32) -> Result<Tick> {
        index
            .checked_mul(self.ticks_per_measure())
            .map(Tick::new)
            .ok_or(ScoreError::TickOverflow { tick: index, offset: self.ticks_per_measure() })
    }

    /// Index of the measure containing `tick`
    pub fn measure_of(&self, tick: Tick) -> u32 {
        tick.value / self.ticks_per_measure().max(1)
    }
}
