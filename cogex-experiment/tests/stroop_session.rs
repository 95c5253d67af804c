//! Stroop sessions: difficulty step, pause-then-advance, condition metrics and age.

use cogex_core::{Congruence, Difficulty, Phase, Stimulus, StroopStimulus};
use cogex_experiment::{ExperimentStateMachine, StroopConfig, StroopTask};
use cogex_timing::{ManualTimer, Timer};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Machine = ExperimentStateMachine<StroopTask, ManualTimer, StdRng>;

const MS: u64 = 1_000_000;

fn started(difficulty: Difficulty) -> Machine {
    let mut m = ExperimentStateMachine::new(
        StroopTask::new(StroopConfig::default()),
        ManualTimer::new(),
        StdRng::seed_from_u64(2024),
    );
    assert!(m.start_experiment());
    assert!(m.set_difficulty(difficulty));
    assert!(m.start_test());
    m
}

fn fire_next(m: &mut Machine) {
    let deadline = m.next_deadline().expect("a timer should be pending");
    m.timer.sleep_until(deadline);
    m.poll();
}

fn run_to_stimulus(m: &mut Machine) {
    while !(m.current_phase() == Phase::Stimulus && m.state().showing_stimulus) {
        assert!(!m.is_complete(), "session ended before a stimulus appeared");
        fire_next(m);
    }
}

fn stimulus(m: &Machine) -> StroopStimulus {
    *m.current_stimulus().unwrap()
}

fn rt_for(s: &StroopStimulus) -> u64 {
    match s.family {
        Congruence::Congruent => 500,
        Congruence::Incongruent => 650,
    }
}

#[test]
fn easy_session_reports_stroop_effect_and_age() {
    let mut m = started(Difficulty::Easy);
    assert_eq!(m.state().trials.len(), 36);

    for _ in 0..36 {
        run_to_stimulus(&mut m);
        let s = stimulus(&m);
        m.timer.advance_ms(rt_for(&s));
        assert!(m.handle_response(s.correct_response()));

        // no feedback phase: the stimulus stays up, hidden, for the pause
        assert_eq!(m.current_phase(), Phase::Stimulus);
        assert!(!m.state().showing_stimulus);
        assert_eq!(m.feedback(), None);
        assert_eq!(m.next_deadline(), Some(m.timer.now() + 500 * MS));
        fire_next(&mut m);
    }

    assert!(m.is_complete());
    let metrics = m.performance_metrics().unwrap();
    assert_eq!(metrics.overall.accuracy, 100.0);
    assert_eq!(metrics.overall.total_trials, 36);
    assert_eq!(metrics.congruent.trials, 12);
    assert_eq!(metrics.incongruent.trials, 24);
    assert_eq!(metrics.congruent.mean_reaction_time_ms, 500);
    assert_eq!(metrics.incongruent.mean_reaction_time_ms, 650);
    assert_eq!(metrics.stroop_effect_ms, 150);
    assert_eq!(metrics.difficulty, Difficulty::Easy);

    let seconds = (12.0 * 500.0 + 24.0 * 650.0) / 1000.0;
    assert!((metrics.total_time_seconds - seconds).abs() < 1e-9);
    assert!((metrics.predicted_age - (21.36 + 0.11 * seconds)).abs() < 1e-9);
}

#[test]
fn errors_raise_the_predicted_age() {
    let mut m = started(Difficulty::Easy);
    for i in 0..36 {
        run_to_stimulus(&mut m);
        let s = stimulus(&m);
        m.timer.advance_ms(600);
        let answer = if i < 3 {
            (s.correct_response + 1) % 4
        } else {
            s.correct_response
        };
        m.handle_response(answer);
        fire_next(&mut m);
    }

    let metrics = m.performance_metrics().unwrap();
    assert_eq!(metrics.overall.total_errors, 3);
    assert_eq!(metrics.overall.correct_trials, 33);
    let expected = 21.36 + 0.11 * (36.0 * 0.6) + 3.66 * 3.0;
    assert!((metrics.predicted_age - expected).abs() < 1e-9);
}

#[test]
fn hard_session_scores_by_background_rule() {
    let mut m = started(Difficulty::Hard);
    assert_eq!(m.state().trials.len(), 48);
    for _ in 0..48 {
        run_to_stimulus(&mut m);
        let s = stimulus(&m);
        m.timer.advance_ms(700);
        let answer = match s.background.map(|b| b.rule()) {
            Some(cogex_core::TaskRule::Word) => s.word.index(),
            _ => s.ink.index(),
        };
        m.handle_response(answer);
        fire_next(&mut m);
    }

    let metrics = m.performance_metrics().unwrap();
    assert_eq!(metrics.overall.accuracy, 100.0);
    assert_eq!(metrics.difficulty, Difficulty::Hard);
    let seconds = 48.0 * 0.7;
    assert!((metrics.predicted_age - (21.36 + 0.11 * seconds - 2.5)).abs() < 1e-9);
}

#[test]
fn stimulus_waits_without_timeout() {
    let mut m = started(Difficulty::Easy);
    run_to_stimulus(&mut m);
    assert!(!m.has_pending_timer());

    m.timer.advance_ms(60_000);
    m.poll();
    assert_eq!(m.current_phase(), Phase::Stimulus);

    let s = stimulus(&m);
    assert!(m.handle_response(s.correct_response()));
    assert_eq!(
        m.state().trials[0].outcome().unwrap().reaction_time_ms,
        60_000
    );
}

#[test]
fn second_click_during_pause_is_ignored() {
    let mut m = started(Difficulty::Easy);
    run_to_stimulus(&mut m);
    let s = stimulus(&m);
    m.timer.advance_ms(420);
    assert!(m.handle_response(s.correct_response()));
    m.timer.advance_ms(10);
    assert!(!m.handle_response((s.correct_response() + 1) % 4));

    let outcome = m.state().trials[0].outcome().unwrap();
    assert_eq!(outcome.reaction_time_ms, 420);
    assert_eq!(outcome.response, Some(s.correct_response()));
}

#[test]
fn partial_session_metrics_cover_completed_trials_only() {
    let mut m = started(Difficulty::Easy);
    run_to_stimulus(&mut m);
    let s = stimulus(&m);
    m.timer.advance_ms(480);
    m.handle_response(s.correct_response());

    let metrics = m.performance_metrics().unwrap();
    assert_eq!(metrics.overall.total_trials, 1);
    assert_eq!(metrics.overall.mean_reaction_time_ms, 480);
    assert!((metrics.total_time_seconds - 0.48).abs() < 1e-9);
}
