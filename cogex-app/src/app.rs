use crate::participant::{Distractor, Plan, SimulatedParticipant};
use anyhow::{Result, bail};
use cogex_core::{Phase, TrialResult};
use cogex_experiment::{ExperimentEvent, ExperimentStateMachine, ResponseOf, Task};
use cogex_timing::Timer;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Everything printed at the end of a session
#[derive(Debug, Serialize)]
pub struct SessionReport<M> {
    pub task: &'static str,
    pub metrics: M,
    pub trials: Vec<TrialResult>,
}

/// A response waiting for its moment
struct Pending<Resp> {
    trial: usize,
    due_ns: u64,
    response: Resp,
}

/// Drives one session from welcome to results. The clock only moves through
/// `sleep_until`, so a manual timer jumps between events and a wall clock waits.
pub struct App<K, T, R, G>
where
    K: Task,
    T: Timer,
    R: Rng,
    G: Rng,
{
    machine: ExperimentStateMachine<K, T, R>,
    participant: SimulatedParticipant<G>,
    pending: Option<Pending<ResponseOf<K>>>,
    planned_for: Option<usize>,
}

impl<K, T, R, G> App<K, T, R, G>
where
    K: Task,
    K::Stimulus: Distractor,
    T: Timer,
    R: Rng,
    G: Rng,
{
    pub fn new(machine: ExperimentStateMachine<K, T, R>, participant: SimulatedParticipant<G>) -> Self {
        Self {
            machine,
            participant,
            pending: None,
            planned_for: None,
        }
    }

    pub fn run(mut self, selection: Option<K::Selection>) -> Result<SessionReport<K::Metrics>> {
        self.machine.submit(ExperimentEvent::Start);
        if let Some(selection) = selection {
            self.machine.submit(ExperimentEvent::DifficultySelected(selection));
        }
        self.machine.submit(ExperimentEvent::BeginTest);
        self.machine.pump();

        let phase = self.machine.current_phase();
        if !matches!(phase, Phase::Fixation | Phase::Results) {
            bail!("{} session did not start, stuck in {phase}", K::NAME);
        }
        info!(
            task = K::NAME,
            trials = self.machine.state().trials.len(),
            "session started"
        );

        while !self.machine.is_complete() {
            self.step()?;
        }

        Ok(SessionReport {
            task: K::NAME,
            metrics: self.machine.performance_metrics()?,
            trials: self.machine.results(),
        })
    }

    fn step(&mut self) -> Result<()> {
        let response_due = self.pending.as_ref().map(|p| p.due_ns);
        let next = match (self.machine.next_deadline(), response_due) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => match a.or(b) {
                Some(next) => next,
                None => bail!(
                    "{} session stalled in {} with nothing scheduled",
                    K::NAME,
                    self.machine.current_phase()
                ),
            },
        };
        self.machine.timer.sleep_until(next);

        let now = self.machine.timer.now();
        if let Some(p) = self.pending.take_if(|p| p.due_ns <= now) {
            debug!(task = K::NAME, trial = p.trial, "participant responds");
            self.machine.submit(ExperimentEvent::Response(p.response));
        }
        self.machine.pump();
        self.plan_if_new_stimulus();
        Ok(())
    }

    fn plan_if_new_stimulus(&mut self) {
        let state = self.machine.state();
        if state.phase != Phase::Stimulus || !state.showing_stimulus {
            return;
        }
        let trial = state.current_trial;
        if self.planned_for == Some(trial) {
            return;
        }
        let (Some(stimulus), Some(shown_ns)) =
            (self.machine.current_stimulus(), state.stimulus_start_ns)
        else {
            return;
        };

        let can_miss = self.machine.task.stimulus_timeout().is_some();
        self.planned_for = Some(trial);
        self.pending = match self.participant.plan(stimulus, can_miss) {
            Plan::Respond { after_ms, response } => Some(Pending {
                trial,
                due_ns: shown_ns.saturating_add(after_ms.saturating_mul(1_000_000)),
                response,
            }),
            Plan::Ignore => {
                debug!(task = K::NAME, trial, "participant lets the stimulus pass");
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::Difficulty;
    use cogex_experiment::{ReactionTimeConfig, ReactionTimeTask, StroopTask};
    use cogex_timing::ManualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn participant(error_rate: f64, miss_rate: f64) -> SimulatedParticipant<StdRng> {
        SimulatedParticipant::new(400, 100, error_rate, miss_rate, StdRng::seed_from_u64(11))
    }

    #[test]
    fn perfect_reaction_session() {
        let machine = ExperimentStateMachine::new(
            ReactionTimeTask::new(ReactionTimeConfig {
                repetitions: 3,
                ..Default::default()
            }),
            ManualTimer::new(),
            StdRng::seed_from_u64(1),
        );
        let report = App::new(machine, participant(0.0, 0.0)).run(None).unwrap();
        assert_eq!(report.task, "reaction-time");
        assert_eq!(report.trials.len(), 6);
        assert_eq!(report.metrics.accuracy, 100.0);
        assert_eq!(report.metrics.timeouts, 0);
        assert!((300..=500).contains(&report.metrics.mean_reaction_time_ms));
    }

    #[test]
    fn missed_stimuli_time_out() {
        let machine = ExperimentStateMachine::new(
            ReactionTimeTask::default(),
            ManualTimer::new(),
            StdRng::seed_from_u64(2),
        );
        let report = App::new(machine, participant(0.0, 1.0)).run(None).unwrap();
        assert_eq!(report.metrics.timeouts, 10);
        assert_eq!(report.metrics.accuracy, 0.0);
        assert!(report.trials.iter().all(|t| t.response.is_none()));
    }

    #[test]
    fn stroop_session_never_stalls() {
        let machine = ExperimentStateMachine::new(
            StroopTask::default(),
            ManualTimer::new(),
            StdRng::seed_from_u64(3),
        );
        let report = App::new(machine, participant(0.2, 1.0))
            .run(Some(Difficulty::Hard))
            .unwrap();
        assert_eq!(report.metrics.overall.total_trials, 48);
        assert_eq!(report.metrics.difficulty, Difficulty::Hard);
        assert!(report.trials.iter().all(|t| t.condition.is_some()));
        assert!(report.metrics.predicted_age >= 15.0);
    }

    #[test]
    fn report_serializes_metrics_and_trials() {
        let machine = ExperimentStateMachine::new(
            ReactionTimeTask::default(),
            ManualTimer::new(),
            StdRng::seed_from_u64(4),
        );
        let report = App::new(machine, participant(0.1, 0.1)).run(None).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["task"], "reaction-time");
        assert!(json["metrics"]["accuracy"].is_number());
        assert_eq!(json["trials"].as_array().unwrap().len(), 10);
    }
}
