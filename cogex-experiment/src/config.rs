use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing and size of the two-choice reaction-time task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTimeConfig {
    /// How many times the base set is repeated
    pub repetitions: usize,
    pub fixation_durations_ms: Vec<u64>,
    /// Auto-advance when no key arrives within this window
    pub stimulus_timeout_ms: u64,
    pub feedback_duration_ms: u64,
    /// Extra gap after feedback that followed a response
    pub post_trial_gap_ms: u64,
}

impl Default for ReactionTimeConfig {
    fn default() -> Self {
        Self {
            repetitions: 5,
            fixation_durations_ms: vec![250, 500, 750, 1000, 1250, 1500, 1750, 2000],
            stimulus_timeout_ms: 2000,
            feedback_duration_ms: 400,
            post_trial_gap_ms: 500,
        }
    }
}

impl ReactionTimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if self.fixation_durations_ms.is_empty() {
            return Err(ConfigError::EmptyFixationDurations);
        }
        if self.stimulus_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("stimulus_timeout_ms"));
        }
        Ok(())
    }
}

/// Timing of the Stroop task; the pool size is fixed by difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StroopConfig {
    pub fixation_durations_ms: Vec<u64>,
    /// Pause between a response and the next fixation
    pub inter_trial_ms: u64,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            fixation_durations_ms: vec![500, 750, 1000, 1250, 1500],
            inter_trial_ms: 500,
        }
    }
}

impl StroopConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixation_durations_ms.is_empty() {
            return Err(ConfigError::EmptyFixationDurations);
        }
        Ok(())
    }
}

/// Both tasks' settings. Any subset may be given in a JSON file,
/// missing fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub reaction_time: ReactionTimeConfig,
    pub stroop: StroopConfig,
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reaction_time.validate()?;
        self.stroop.validate()
    }
}
