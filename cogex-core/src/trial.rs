use crate::stimulus::Stimulus;
use serde::{Deserialize, Serialize};

/// What happened on a trial. `response` is `None` when the trial timed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<R> {
    pub response: Option<R>,
    pub reaction_time_ms: u64,
    pub correct: bool,
    pub timestamp_ns: u64,
}

impl<R> Outcome<R> {
    pub fn responded(response: R, reaction_time_ms: u64, correct: bool, timestamp_ns: u64) -> Self {
        Self {
            response: Some(response),
            reaction_time_ms,
            correct,
            timestamp_ns,
        }
    }

    pub fn timed_out(reaction_time_ms: u64, timestamp_ns: u64) -> Self {
        Self {
            response: None,
            reaction_time_ms,
            correct: false,
            timestamp_ns,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.response.is_none()
    }
}

/// A stimulus plus its write-once outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Trial<S: Stimulus> {
    pub id: usize,
    pub stimulus: S,
    pub created_ns: u64,
    outcome: Option<Outcome<S::Response>>,
}

impl<S: Stimulus> Trial<S> {
    pub fn new(id: usize, stimulus: S, created_ns: u64) -> Self {
        Self {
            id,
            stimulus,
            created_ns,
            outcome: None,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome<S::Response>> {
        self.outcome.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_correct(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.correct)
    }

    /// Stores the outcome unless one was already recorded
    pub fn record(&mut self, outcome: Outcome<S::Response>) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn result(&self) -> TrialResult {
        TrialResult {
            trial_id: self.id,
            stimulus: self.stimulus.label(),
            condition: self.stimulus.condition_tag().map(str::to_owned),
            expected: self.stimulus.correct_response().to_string(),
            response: self
                .outcome
                .as_ref()
                .and_then(|o| o.response.as_ref())
                .map(ToString::to_string),
            reaction_time_ms: self.outcome.as_ref().map(|o| o.reaction_time_ms),
            correct: self.outcome.as_ref().map(|o| o.correct),
            timestamp_ns: self
                .outcome
                .as_ref()
                .map_or(self.created_ns, |o| o.timestamp_ns),
        }
    }
}

/// Recorded result per trial, flattened for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: usize,
    pub stimulus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub expected: String,
    pub response: Option<String>,
    pub reaction_time_ms: Option<u64>,
    pub correct: Option<bool>,
    pub timestamp_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::{ColorPatch, Key};

    #[test]
    fn outcome_is_write_once() {
        let mut trial = Trial::new(0, ColorPatch::Blue, 10);
        assert!(!trial.is_completed());

        assert!(trial.record(Outcome::responded(Key::new("f"), 320, true, 20)));
        assert!(!trial.record(Outcome::timed_out(2000, 30)));

        let outcome = trial.outcome().unwrap();
        assert_eq!(outcome.reaction_time_ms, 320);
        assert!(outcome.correct);
        assert!(trial.is_correct());
    }

    #[test]
    fn timeout_counts_as_completed_but_incorrect() {
        let mut trial = Trial::new(3, ColorPatch::Orange, 0);
        trial.record(Outcome::timed_out(2000, 5));
        assert!(trial.is_completed());
        assert!(!trial.is_correct());
        assert!(trial.outcome().unwrap().is_timeout());
    }

    #[test]
    fn result_flattens_outcome() {
        let mut trial = Trial::new(1, ColorPatch::Orange, 7);
        assert_eq!(trial.result().timestamp_ns, 7);
        assert_eq!(trial.result().reaction_time_ms, None);

        trial.record(Outcome::responded(Key::new("F"), 412, false, 99));
        let result = trial.result();
        assert_eq!(result.stimulus, "orange");
        assert_eq!(result.condition, None);
        assert_eq!(result.expected, "j");
        assert_eq!(result.response.as_deref(), Some("f"));
        assert_eq!(result.correct, Some(false));
        assert_eq!(result.timestamp_ns, 99);
    }
}
