use super::generator::generate_trials;
use super::task::Task;
use crate::error::ExperimentError;
use cogex_core::{Outcome, Phase, Stimulus, Trial, TrialResult};
use cogex_timing::{Scheduler, Timer, TimerId};
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace};

pub type ResponseOf<K> = <<K as Task>::Stimulus as Stimulus>::Response;

/// Commands accepted by the state machine, either directly or through the queue
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentEvent<Sel, Resp> {
    Start,
    DifficultySelected(Sel),
    BeginTest,
    BeginFixation,
    Response(Resp),
    /// Fire every timer that is due
    Tick,
    Reset,
}

pub type EventFor<K> = ExperimentEvent<<K as Task>::Selection, ResponseOf<K>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    TooSlow,
}

impl FeedbackKind {
    fn for_answer(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Correct => "Correct!",
            Self::Incorrect => "Incorrect!",
            Self::TooSlow => "Too slow!",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Transitions that happen on their own after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    ShowStimulus,
    Timeout,
    Advance,
}

/// Everything the presentation layer needs to draw the current screen
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentState<S: Stimulus, Sel> {
    pub phase: Phase,
    pub current_trial: usize,
    pub trials: Vec<Trial<S>>,
    pub showing_stimulus: bool,
    pub stimulus_start_ns: Option<u64>,
    pub feedback: Option<FeedbackKind>,
    pub fading_out: bool,
    pub selection: Option<Sel>,
    pub started_ns: Option<u64>,
}

impl<S: Stimulus, Sel> Default for ExperimentState<S, Sel> {
    fn default() -> Self {
        Self {
            phase: Phase::Welcome,
            current_trial: 0,
            trials: Vec::new(),
            showing_stimulus: false,
            stimulus_start_ns: None,
            feedback: None,
            fading_out: false,
            selection: None,
            started_ns: None,
        }
    }
}

impl<S: Stimulus, Sel> ExperimentState<S, Sel> {
    pub fn current(&self) -> Option<&Trial<S>> {
        self.trials.get(self.current_trial)
    }

    pub fn completed_trials(&self) -> usize {
        self.trials.iter().filter(|t| t.is_completed()).count()
    }
}

/// Phase engine shared by every task. Single writer: all mutation goes
/// through `&mut self`, delayed transitions sit in the scheduler until
/// [`ExperimentStateMachine::poll`] finds them due.
pub struct ExperimentStateMachine<K, T, R>
where
    K: Task,
    T: Timer,
    R: Rng,
{
    pub task: K,
    pub timer: T,
    rng: R,
    state: ExperimentState<K::Stimulus, K::Selection>,
    scheduler: Scheduler<Deferred>,
    pending: Option<TimerId>,
    queue: VecDeque<EventFor<K>>,
}

impl<K, T, R> ExperimentStateMachine<K, T, R>
where
    K: Task,
    T: Timer,
    R: Rng,
{
    pub fn new(task: K, timer: T, rng: R) -> Self {
        Self {
            task,
            timer,
            rng,
            state: ExperimentState::default(),
            scheduler: Scheduler::new(),
            pending: None,
            queue: VecDeque::new(),
        }
    }

    pub fn handle_event(&mut self, event: EventFor<K>) -> bool {
        match event {
            ExperimentEvent::Start => self.start_experiment(),
            ExperimentEvent::DifficultySelected(selection) => self.set_difficulty(selection),
            ExperimentEvent::BeginTest => self.start_test(),
            ExperimentEvent::BeginFixation => self.start_fixation(),
            ExperimentEvent::Response(response) => self.handle_response(response),
            ExperimentEvent::Tick => self.poll() > 0,
            ExperimentEvent::Reset => {
                self.reset_experiment();
                true
            }
        }
    }

    /// Queues an event for [`Self::pump`]
    pub fn submit(&mut self, event: EventFor<K>) {
        self.queue.push_back(event);
    }

    /// Handles queued events in arrival order, firing due timers before and
    /// after each one. Returns how many events changed the state.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        self.poll();
        while let Some(event) = self.queue.pop_front() {
            if self.handle_event(event) {
                handled += 1;
            }
            self.poll();
        }
        handled
    }

    /// Fires every deferred transition whose deadline has passed
    pub fn poll(&mut self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.timer.now();
            let Some((id, event)) = self.scheduler.pop_due(now) else {
                break;
            };
            if self.pending == Some(id) {
                self.pending = None;
            }
            self.fire(event);
            fired += 1;
        }
        fired
    }

    pub fn start_experiment(&mut self) -> bool {
        self.poll();
        if !self.state.phase.is_welcome() {
            debug!(task = K::NAME, phase = %self.state.phase, "start ignored outside welcome");
            return false;
        }
        if K::SELECTS_DIFFICULTY {
            self.enter(Phase::Difficulty);
        } else {
            self.generate(K::Selection::default());
            self.enter(Phase::Instructions);
        }
        true
    }

    pub fn set_difficulty(&mut self, selection: K::Selection) -> bool {
        self.poll();
        if !K::SELECTS_DIFFICULTY || self.state.phase != Phase::Difficulty {
            debug!(task = K::NAME, phase = %self.state.phase, "difficulty ignored");
            return false;
        }
        self.generate(selection);
        self.enter(Phase::Instructions);
        true
    }

    pub fn start_test(&mut self) -> bool {
        self.poll();
        if self.state.phase != Phase::Instructions {
            debug!(task = K::NAME, phase = %self.state.phase, "test start ignored");
            return false;
        }
        self.state.current_trial = 0;
        if self.state.trials.is_empty() {
            self.finish();
        } else {
            self.enter_fixation();
        }
        true
    }

    /// Restarts the fixation interval of the current trial
    pub fn start_fixation(&mut self) -> bool {
        self.poll();
        if self.state.phase != Phase::Fixation {
            debug!(task = K::NAME, phase = %self.state.phase, "fixation ignored");
            return false;
        }
        self.enter_fixation();
        true
    }

    /// Records the response for the visible stimulus. Anything arriving
    /// while no stimulus is showing is dropped. Overdue timers fire first,
    /// so a key pressed after the timeout deadline loses to the timeout.
    pub fn handle_response(&mut self, response: ResponseOf<K>) -> bool {
        self.poll();
        let start = match self.state.stimulus_start_ns {
            Some(start) if self.state.phase.allows_input() && self.state.showing_stimulus => start,
            _ => {
                debug!(
                    task = K::NAME,
                    phase = %self.state.phase,
                    showing = self.state.showing_stimulus,
                    "response ignored"
                );
                return false;
            }
        };

        let now = self.timer.now();
        let index = self.state.current_trial;
        let Some(trial) = self.state.trials.get_mut(index) else {
            return false;
        };

        let reaction_time_ms = now.saturating_sub(start) / 1_000_000;
        let correct = trial.stimulus.is_correct(&response);
        if !trial.record(Outcome::responded(response, reaction_time_ms, correct, now)) {
            debug!(task = K::NAME, trial = index, "outcome already recorded");
            return false;
        }

        info!(
            task = K::NAME,
            trial = index,
            stimulus = %trial.stimulus.label(),
            rt_ms = reaction_time_ms,
            correct,
            "response recorded"
        );
        let advance_after = self.task.response_advance();
        self.conclude_trial(FeedbackKind::for_answer(correct), advance_after);
        true
    }

    pub fn performance_metrics(&self) -> Result<K::Metrics, ExperimentError> {
        self.task.metrics(&self.state.trials, self.state.selection)
    }

    /// Back to welcome with no trials; every pending timer is dropped
    pub fn reset_experiment(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.pending = None;
        self.state = ExperimentState::default();
        info!(task = K::NAME, cancelled, "session reset");
    }

    fn generate(&mut self, selection: K::Selection) {
        let now = self.timer.now();
        let stimuli = self.task.stimuli(selection);
        self.state.trials = generate_trials(stimuli, now, &mut self.rng);
        self.state.current_trial = 0;
        self.state.selection = Some(selection);
        self.state.started_ns = Some(now);
        info!(
            task = K::NAME,
            trials = self.state.trials.len(),
            ?selection,
            "trials generated"
        );
    }

    fn enter(&mut self, phase: Phase) {
        self.cancel_pending();
        trace!(task = K::NAME, from = %self.state.phase, to = %phase, "phase change");
        self.state.phase = phase;
    }

    fn enter_fixation(&mut self) {
        self.enter(Phase::Fixation);
        self.state.showing_stimulus = false;
        self.state.stimulus_start_ns = None;
        self.state.feedback = None;
        self.state.fading_out = false;

        let fixation_ms = self.pick_fixation_ms();
        debug!(
            task = K::NAME,
            trial = self.state.current_trial,
            fixation_ms,
            "fixation"
        );
        self.schedule(Duration::from_millis(fixation_ms), Deferred::ShowStimulus);
    }

    fn pick_fixation_ms(&mut self) -> u64 {
        let durations = self.task.fixation_durations_ms();
        if durations.is_empty() {
            return 0;
        }
        durations[self.rng.random_range(0..durations.len())]
    }

    fn enter_stimulus(&mut self) {
        self.enter(Phase::Stimulus);
        let now = self.timer.now();
        self.state.showing_stimulus = true;
        self.state.stimulus_start_ns = Some(now);
        if let Some(timeout) = self.task.stimulus_timeout() {
            self.schedule(timeout, Deferred::Timeout);
        }
    }

    fn expire_stimulus(&mut self) {
        let index = self.state.current_trial;
        let now = self.timer.now();
        let timeout_ms = self
            .task
            .stimulus_timeout()
            .map_or(0, |d| d.as_millis() as u64);
        let Some(trial) = self.state.trials.get_mut(index) else {
            return;
        };
        if !trial.record(Outcome::timed_out(timeout_ms, now)) {
            return;
        }
        info!(task = K::NAME, trial = index, timeout_ms, "no response in time");
        let advance_after = self.task.timeout_advance();
        self.conclude_trial(FeedbackKind::TooSlow, advance_after);
    }

    fn conclude_trial(&mut self, feedback: FeedbackKind, advance_after: Duration) {
        self.state.showing_stimulus = false;
        if K::SHOWS_FEEDBACK {
            self.enter(Phase::Feedback);
            self.state.feedback = Some(feedback);
            self.state.fading_out = true;
        }
        self.schedule(advance_after, Deferred::Advance);
    }

    fn advance(&mut self) {
        if self.state.current_trial + 1 < self.state.trials.len() {
            self.state.current_trial += 1;
            self.enter_fixation();
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.enter(Phase::Results);
        self.state.showing_stimulus = false;
        info!(
            task = K::NAME,
            completed = self.state.completed_trials(),
            total = self.state.trials.len(),
            "session complete"
        );
    }

    fn fire(&mut self, event: Deferred) {
        let phase = self.state.phase;
        let showing = self.state.showing_stimulus;
        match event {
            Deferred::ShowStimulus if phase == Phase::Fixation => self.enter_stimulus(),
            Deferred::Timeout if phase == Phase::Stimulus && showing => self.expire_stimulus(),
            Deferred::Advance
                if phase == Phase::Feedback || (phase == Phase::Stimulus && !showing) =>
            {
                self.advance()
            }
            stale => debug!(task = K::NAME, ?stale, %phase, "stale timer ignored"),
        }
    }

    fn schedule(&mut self, delay: Duration, event: Deferred) {
        self.cancel_pending();
        let id = self
            .scheduler
            .schedule_after(self.timer.now(), delay, event);
        self.pending = Some(id);
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            if self.scheduler.cancel(id) {
                trace!(task = K::NAME, %id, "superseded timer cancelled");
            }
        }
    }

    pub fn state(&self) -> &ExperimentState<K::Stimulus, K::Selection> {
        &self.state
    }

    /// Returns current phase
    pub fn current_phase(&self) -> Phase {
        self.state.phase
    }

    /// Stimulus of the trial in progress, while the trial loop is running
    pub fn current_stimulus(&self) -> Option<&K::Stimulus> {
        if !self.state.phase.is_trial() {
            return None;
        }
        self.state.current().map(|t| &t.stimulus)
    }

    /// Feedback and whether it is fading out
    pub fn feedback(&self) -> Option<(FeedbackKind, bool)> {
        self.state.feedback.map(|f| (f, self.state.fading_out))
    }

    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.state
            .phase
            .is_trial()
            .then(|| (self.state.current_trial + 1, self.state.trials.len()))
    }

    pub fn results(&self) -> Vec<TrialResult> {
        self.state.trials.iter().map(Trial::result).collect()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn has_pending_timer(&self) -> bool {
        !self.scheduler.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase.is_terminal()
    }
}
