use crate::age::predict_age;
use crate::error::AgeModelError;
use cogex_core::{Congruence, Difficulty, Outcome, Stimulus, StroopStimulus, Trial};
use serde::{Deserialize, Serialize};

/// Aggregate performance over the completed trials of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Percent of completed trials answered correctly. Unrounded here;
    /// the reaction-time task rounds it via [`Self::with_rounded_accuracy`].
    pub accuracy: f64,
    /// Mean over correct trials only, rounded to the millisecond
    pub mean_reaction_time_ms: u64,
    pub correct_trials: usize,
    /// Completed trials, timeouts included
    pub total_trials: usize,
    pub total_errors: usize,
    pub timeouts: usize,
}

impl PerformanceMetrics {
    pub fn from_trials<S: Stimulus>(trials: &[Trial<S>]) -> Self {
        Self::from_outcomes(trials.iter().filter_map(Trial::outcome))
    }

    pub fn from_outcomes<'a, R: 'a>(outcomes: impl Iterator<Item = &'a Outcome<R>>) -> Self {
        let mut total = 0usize;
        let mut correct = 0usize;
        let mut timeouts = 0usize;
        let mut correct_rt_sum = 0u64;

        for o in outcomes {
            total += 1;
            if o.is_timeout() {
                timeouts += 1;
            }
            if o.correct {
                correct += 1;
                correct_rt_sum += o.reaction_time_ms;
            }
        }

        Self {
            accuracy: percent(correct, total),
            mean_reaction_time_ms: rounded_mean(correct_rt_sum, correct),
            correct_trials: correct,
            total_trials: total,
            total_errors: total - correct,
            timeouts,
        }
    }

    /// Accuracy as a whole percent, the way the reaction-time summary shows it
    pub fn with_rounded_accuracy(mut self) -> Self {
        self.accuracy = self.accuracy.round();
        self
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn rounded_mean(sum_ms: u64, n: usize) -> u64 {
    if n == 0 {
        0
    } else {
        (sum_ms as f64 / n as f64).round() as u64
    }
}

/// Accuracy and speed for one congruence family
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionMetrics {
    pub accuracy: f64,
    pub mean_reaction_time_ms: u64,
    pub trials: usize,
}

impl From<PerformanceMetrics> for ConditionMetrics {
    fn from(m: PerformanceMetrics) -> Self {
        Self {
            accuracy: m.accuracy,
            mean_reaction_time_ms: m.mean_reaction_time_ms,
            trials: m.total_trials,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StroopPerformanceMetrics {
    #[serde(flatten)]
    pub overall: PerformanceMetrics,
    pub congruent: ConditionMetrics,
    pub incongruent: ConditionMetrics,
    /// Incongruent minus congruent mean RT; negative when incongruent was faster
    pub stroop_effect_ms: i64,
    pub total_time_seconds: f64,
    pub difficulty: Difficulty,
    pub predicted_age: f64,
}

pub fn stroop_effect(congruent_ms: u64, incongruent_ms: u64) -> i64 {
    incongruent_ms as i64 - congruent_ms as i64
}

fn family_metrics(trials: &[Trial<StroopStimulus>], family: Congruence) -> ConditionMetrics {
    PerformanceMetrics::from_outcomes(
        trials
            .iter()
            .filter(|t| t.stimulus.family == family)
            .filter_map(Trial::outcome),
    )
    .into()
}

impl StroopPerformanceMetrics {
    pub fn from_trials(
        trials: &[Trial<StroopStimulus>],
        difficulty: Difficulty,
    ) -> Result<Self, AgeModelError> {
        let overall = PerformanceMetrics::from_trials(trials);
        let congruent = family_metrics(trials, Congruence::Congruent);
        let incongruent = family_metrics(trials, Congruence::Incongruent);

        let total_time_ms: u64 = trials
            .iter()
            .filter_map(Trial::outcome)
            .map(|o| o.reaction_time_ms)
            .sum();
        let total_time_seconds = total_time_ms as f64 / 1000.0;
        let predicted_age = predict_age(
            total_time_seconds,
            overall.total_errors as i64,
            difficulty,
        )?;

        Ok(Self {
            overall,
            congruent,
            incongruent,
            stroop_effect_ms: stroop_effect(
                congruent.mean_reaction_time_ms,
                incongruent.mean_reaction_time_ms,
            ),
            total_time_seconds,
            difficulty,
            predicted_age,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{ColorPatch, InkColor, Key};

    fn answered(stimulus: StroopStimulus, rt: u64, correct: bool) -> Trial<StroopStimulus> {
        let mut t = Trial::new(0, stimulus, 0);
        let response = if correct {
            stimulus.correct_response
        } else {
            (stimulus.correct_response + 1) % 4
        };
        t.record(Outcome::responded(response, rt, correct, 0));
        t
    }

    fn congruent() -> StroopStimulus {
        StroopStimulus::new(InkColor::Red, InkColor::Red, None)
    }

    fn incongruent() -> StroopStimulus {
        StroopStimulus::new(InkColor::Red, InkColor::Green, None)
    }

    #[test]
    fn empty_session_has_zero_defaults() {
        let trials: Vec<Trial<ColorPatch>> = vec![Trial::new(0, ColorPatch::Blue, 0)];
        let m = PerformanceMetrics::from_trials(&trials);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.mean_reaction_time_ms, 0);
        assert_eq!(m.total_trials, 0);
    }

    #[test]
    fn timeouts_are_completed_errors_without_rt() {
        let mut a = Trial::new(0, ColorPatch::Blue, 0);
        a.record(Outcome::responded(Key::new("f"), 301, true, 0));
        let mut b = Trial::new(1, ColorPatch::Orange, 0);
        b.record(Outcome::responded(Key::new("j"), 400, true, 0));
        let mut c = Trial::new(2, ColorPatch::Orange, 0);
        c.record(Outcome::timed_out(2000, 0));

        let m = PerformanceMetrics::from_trials(&[a, b, c]);
        assert_eq!(m.total_trials, 3);
        assert_eq!(m.correct_trials, 2);
        assert_eq!(m.total_errors, 1);
        assert_eq!(m.timeouts, 1);
        assert!((m.accuracy - 200.0 / 3.0).abs() < 1e-9);
        // 350.5 rounds up
        assert_eq!(m.mean_reaction_time_ms, 351);
        assert_eq!(m.with_rounded_accuracy().accuracy, 67.0);
    }

    #[test]
    fn stroop_effect_is_signed() {
        assert_eq!(stroop_effect(500, 650), 150);
        assert_eq!(stroop_effect(650, 500), -150);
    }

    #[test]
    fn stroop_metrics_split_by_family() {
        let trials = vec![
            answered(congruent(), 500, true),
            answered(congruent(), 520, false),
            answered(incongruent(), 650, true),
            answered(incongruent(), 700, true),
        ];
        let m = StroopPerformanceMetrics::from_trials(&trials, Difficulty::Easy).unwrap();

        assert_eq!(m.congruent.trials, 2);
        assert_eq!(m.congruent.accuracy, 50.0);
        assert_eq!(m.congruent.mean_reaction_time_ms, 500);
        assert_eq!(m.incongruent.mean_reaction_time_ms, 675);
        assert_eq!(m.stroop_effect_ms, 175);
        assert_eq!(m.overall.total_errors, 1);
        assert!((m.total_time_seconds - 2.37).abs() < 1e-9);

        let expected_age = 21.36 + 0.11 * 2.37 + 3.66;
        assert!((m.predicted_age - expected_age).abs() < 1e-9);
    }

    #[test]
    fn unanswered_stroop_trials_are_ignored() {
        let trials = vec![Trial::new(0, incongruent(), 0)];
        let m = StroopPerformanceMetrics::from_trials(&trials, Difficulty::Hard).unwrap();
        assert_eq!(m.overall.total_trials, 0);
        assert_eq!(m.stroop_effect_ms, 0);
        assert_eq!(m.total_time_seconds, 0.0);
        assert!((m.predicted_age - 18.86).abs() < 1e-9);
    }

    #[test]
    fn metrics_serialize_flat() {
        let trials = vec![answered(congruent(), 480, true)];
        let m = StroopPerformanceMetrics::from_trials(&trials, Difficulty::Easy).unwrap();
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["accuracy"], 100.0);
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["congruent"]["mean_reaction_time_ms"], 480);
    }
}
