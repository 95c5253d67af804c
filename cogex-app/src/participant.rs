use cogex_core::{ColorPatch, InkColor, Key, Stimulus, StroopStimulus};
use rand::Rng;

/// Stimuli that can produce a plausible wrong answer
pub trait Distractor: Stimulus {
    fn wrong_response<R: Rng>(&self, rng: &mut R) -> Self::Response;
}

impl Distractor for ColorPatch {
    fn wrong_response<R: Rng>(&self, _: &mut R) -> Key {
        match self {
            ColorPatch::Blue => ColorPatch::Orange.correct_response(),
            ColorPatch::Orange => ColorPatch::Blue.correct_response(),
        }
    }
}

impl Distractor for StroopStimulus {
    fn wrong_response<R: Rng>(&self, rng: &mut R) -> usize {
        // any of the other three buttons
        let offset = rng.random_range(1..InkColor::ALL.len());
        (self.correct_response + offset) % InkColor::ALL.len()
    }
}

/// What the participant does with one stimulus
#[derive(Debug, Clone, PartialEq)]
pub enum Plan<R> {
    Respond { after_ms: u64, response: R },
    Ignore,
}

/// Answers stimuli with a jittered reaction time and fixed error and miss rates
#[derive(Debug, Clone)]
pub struct SimulatedParticipant<G: Rng> {
    pub mean_rt_ms: u64,
    pub rt_spread_ms: u64,
    pub error_rate: f64,
    pub miss_rate: f64,
    rng: G,
}

const FASTEST_RT_MS: u64 = 120;

/// Clamps into `[0, 1]`; NaN counts as never
fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

impl<G: Rng> SimulatedParticipant<G> {
    pub fn new(mean_rt_ms: u64, rt_spread_ms: u64, error_rate: f64, miss_rate: f64, rng: G) -> Self {
        Self {
            mean_rt_ms,
            rt_spread_ms,
            error_rate: probability(error_rate),
            miss_rate: probability(miss_rate),
            rng,
        }
    }

    /// `can_miss` is false for tasks that wait forever, where a miss would stall
    pub fn plan<S: Distractor>(&mut self, stimulus: &S, can_miss: bool) -> Plan<S::Response> {
        if can_miss && self.rng.random_bool(self.miss_rate) {
            return Plan::Ignore;
        }
        let response = if self.rng.random_bool(self.error_rate) {
            stimulus.wrong_response(&mut self.rng)
        } else {
            stimulus.correct_response()
        };
        Plan::Respond {
            after_ms: self.reaction_time_ms(),
            response,
        }
    }

    fn reaction_time_ms(&mut self) -> u64 {
        let low = self.mean_rt_ms.saturating_sub(self.rt_spread_ms);
        let high = self.mean_rt_ms.saturating_add(self.rt_spread_ms);
        self.rng.random_range(low..=high).max(FASTEST_RT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{Difficulty, stroop_pool};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wrong_stroop_answers_never_hit_the_target() {
        let mut rng = StdRng::seed_from_u64(5);
        for s in stroop_pool(Difficulty::Hard) {
            for _ in 0..10 {
                let wrong = s.wrong_response(&mut rng);
                assert_ne!(wrong, s.correct_response);
                assert!(wrong < 4);
            }
        }
    }

    #[test]
    fn perfect_participant_is_always_right_and_in_range() {
        let mut p = SimulatedParticipant::new(400, 50, 0.0, 0.0, StdRng::seed_from_u64(1));
        for _ in 0..100 {
            match p.plan(&ColorPatch::Orange, true) {
                Plan::Respond { after_ms, response } => {
                    assert_eq!(response, Key::new("j"));
                    assert!((350..=450).contains(&after_ms));
                }
                Plan::Ignore => panic!("miss rate is zero"),
            }
        }
    }

    #[test]
    fn misses_only_when_allowed() {
        let mut p = SimulatedParticipant::new(400, 0, 0.0, 1.0, StdRng::seed_from_u64(2));
        assert_eq!(p.plan(&ColorPatch::Blue, true), Plan::Ignore);
        assert!(matches!(
            p.plan(&ColorPatch::Blue, false),
            Plan::Respond { .. }
        ));
    }

    #[test]
    fn nan_rates_behave_like_zero() {
        let mut p = SimulatedParticipant::new(400, 0, f64::NAN, f64::NAN, StdRng::seed_from_u64(4));
        assert_eq!(p.error_rate, 0.0);
        assert_eq!(p.miss_rate, 0.0);
        assert_eq!(
            p.plan(&ColorPatch::Blue, true),
            Plan::Respond {
                after_ms: 400,
                response: Key::new("f")
            }
        );
    }

    #[test]
    fn extreme_timing_does_not_overflow() {
        let mut p = SimulatedParticipant::new(u64::MAX, 1_000, 0.0, 0.0, StdRng::seed_from_u64(6));
        assert!(p.reaction_time_ms() >= u64::MAX - 1_000);
    }

    #[test]
    fn reaction_time_has_a_floor() {
        let mut p = SimulatedParticipant::new(50, 40, 0.0, 0.0, StdRng::seed_from_u64(3));
        assert!(p.reaction_time_ms() >= FASTEST_RT_MS);
    }
}
