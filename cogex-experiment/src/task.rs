use crate::config::{ReactionTimeConfig, StroopConfig};
use crate::error::ExperimentError;
use crate::generator::repeat_base;
use crate::metrics::{PerformanceMetrics, StroopPerformanceMetrics};
use cogex_core::{ColorPatch, Difficulty, Stimulus, StroopStimulus, Trial, stroop_pool};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Describes one task variant for the shared phase engine
pub trait Task {
    type Stimulus: Stimulus;
    /// Chosen before trials are generated; `()` when there is nothing to choose
    type Selection: Copy + Default + PartialEq + fmt::Debug;
    type Metrics: Serialize + fmt::Debug;

    const NAME: &'static str;
    /// A difficulty step sits between welcome and instructions
    const SELECTS_DIFFICULTY: bool;
    /// Responses are followed by an explicit feedback phase
    const SHOWS_FEEDBACK: bool;

    /// Stimuli for one session, before shuffling
    fn stimuli(&self, selection: Self::Selection) -> Vec<Self::Stimulus>;

    fn fixation_durations_ms(&self) -> &[u64];

    /// How long a stimulus waits for a response before timing out
    fn stimulus_timeout(&self) -> Option<Duration>;

    /// Delay between a recorded response and the next trial
    fn response_advance(&self) -> Duration;

    /// Delay between a timeout and the next trial
    fn timeout_advance(&self) -> Duration;

    fn metrics(
        &self,
        trials: &[Trial<Self::Stimulus>],
        selection: Option<Self::Selection>,
    ) -> Result<Self::Metrics, ExperimentError>;
}

/// Two-choice colour/key task with per-trial feedback and a response window
#[derive(Debug, Clone)]
pub struct ReactionTimeTask {
    pub config: ReactionTimeConfig,
    pub base: Vec<ColorPatch>,
}

impl ReactionTimeTask {
    pub fn new(config: ReactionTimeConfig) -> Self {
        Self {
            config,
            base: ColorPatch::BASE_SET.to_vec(),
        }
    }
}

impl Default for ReactionTimeTask {
    fn default() -> Self {
        Self::new(ReactionTimeConfig::default())
    }
}

impl Task for ReactionTimeTask {
    type Stimulus = ColorPatch;
    type Selection = ();
    type Metrics = PerformanceMetrics;

    const NAME: &'static str = "reaction-time";
    const SELECTS_DIFFICULTY: bool = false;
    const SHOWS_FEEDBACK: bool = true;

    fn stimuli(&self, _: ()) -> Vec<ColorPatch> {
        repeat_base(&self.base, self.config.repetitions)
    }

    fn fixation_durations_ms(&self) -> &[u64] {
        &self.config.fixation_durations_ms
    }

    fn stimulus_timeout(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.config.stimulus_timeout_ms))
    }

    fn response_advance(&self) -> Duration {
        Duration::from_millis(self.config.feedback_duration_ms + self.config.post_trial_gap_ms)
    }

    fn timeout_advance(&self) -> Duration {
        Duration::from_millis(self.config.feedback_duration_ms)
    }

    fn metrics(
        &self,
        trials: &[Trial<ColorPatch>],
        _: Option<()>,
    ) -> Result<PerformanceMetrics, ExperimentError> {
        Ok(PerformanceMetrics::from_trials(trials).with_rounded_accuracy())
    }
}

/// Colour/word interference task; difficulty picks the pool and the age adjustment
#[derive(Debug, Clone, Default)]
pub struct StroopTask {
    pub config: StroopConfig,
}

impl StroopTask {
    pub fn new(config: StroopConfig) -> Self {
        Self { config }
    }
}

impl Task for StroopTask {
    type Stimulus = StroopStimulus;
    type Selection = Difficulty;
    type Metrics = StroopPerformanceMetrics;

    const NAME: &'static str = "stroop";
    const SELECTS_DIFFICULTY: bool = true;
    const SHOWS_FEEDBACK: bool = false;

    fn stimuli(&self, difficulty: Difficulty) -> Vec<StroopStimulus> {
        stroop_pool(difficulty).to_vec()
    }

    fn fixation_durations_ms(&self) -> &[u64] {
        &self.config.fixation_durations_ms
    }

    fn stimulus_timeout(&self) -> Option<Duration> {
        None
    }

    fn response_advance(&self) -> Duration {
        Duration::from_millis(self.config.inter_trial_ms)
    }

    fn timeout_advance(&self) -> Duration {
        Duration::from_millis(self.config.inter_trial_ms)
    }

    fn metrics(
        &self,
        trials: &[Trial<StroopStimulus>],
        difficulty: Option<Difficulty>,
    ) -> Result<StroopPerformanceMetrics, ExperimentError> {
        Ok(StroopPerformanceMetrics::from_trials(
            trials,
            difficulty.unwrap_or_default(),
        )?)
    }
}
