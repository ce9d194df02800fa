use std::path::{Path, PathBuf};

use scorebench_core::{DuplicateOptions, IdPolicy, MeasureGap, PatternParams, TimeModel};

#[derive(serde::Serialize, serde::Deserialize, Default, Debug, PartialEq)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub synth: SynthConfig,
    #[serde(default)]
    pub duplicate: DuplicateConfig,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
#[serde(default)]
pub(crate) struct SynthConfig {
    pub measures: u32,
    /// Ticks per quarter note
    pub resolution: u32,
    pub notes_per_measure: u32,
    /// Note value as a fraction of a whole note (8 = eighth)
    pub note_division: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            measures: 30,
            resolution: 960,
            notes_per_measure: 8,
            note_division: 8,
        }
    }
}

impl SynthConfig {
    /// Dense piano preset with this config's geometry
    pub fn pattern_params(&self) -> PatternParams {
        let time = TimeModel::common_time(self.resolution);
        PatternParams {
            time,
            measure_count: self.measures,
            ticks_per_measure: time.ticks_per_measure(),
            note_duration: time.ticks_for_division(self.note_division),
            notes_per_measure: self.notes_per_measure,
            ..PatternParams::dense_piano()
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Default, Debug, PartialEq)]
#[serde(default)]
pub(crate) struct DuplicateConfig {
    /// Fixed gap in ticks; derived from the document when unset
    pub gap_ticks: Option<u32>,
    pub preserve_ids: bool,
}

impl DuplicateConfig {
    pub fn options(&self) -> DuplicateOptions {
        DuplicateOptions {
            gap: self.gap_ticks.map_or(MeasureGap::FromDocument, MeasureGap::Fixed),
            ids: if self.preserve_ids { IdPolicy::Preserve } else { IdPolicy::Mint },
        }
    }
}

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scorebench")
        .join("config.toml")
}

/// Load config from `path` (or the default location), falling back to
/// defaults when the file is missing or unreadable
pub(crate) fn load_config(path: Option<&Path>) -> AppConfig {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let Ok(s) = std::fs::read_to_string(&path) else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return AppConfig::default();
    };
    match toml::from_str(&s) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring invalid config: {e}");
            AppConfig::default()
        }
    }
}
