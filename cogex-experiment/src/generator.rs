use cogex_core::{Stimulus, Trial};
use rand::Rng;

/// Fisher–Yates: walk from the back, swapping each slot with a uniform pick from `0..=i`
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Every element of `base`, `repetitions` times, in base order
pub fn repeat_base<S: Clone>(base: &[S], repetitions: usize) -> Vec<S> {
    let mut out = Vec::with_capacity(base.len() * repetitions);
    for _ in 0..repetitions {
        out.extend_from_slice(base);
    }
    out
}

/// Shuffles the stimuli and wraps them in fresh trials numbered in presentation order
pub fn generate_trials<S: Stimulus, R: Rng>(
    mut stimuli: Vec<S>,
    created_ns: u64,
    rng: &mut R,
) -> Vec<Trial<S>> {
    shuffle(&mut stimuli, rng);
    stimuli
        .into_iter()
        .enumerate()
        .map(|(id, stimulus)| Trial::new(id, stimulus, created_ns))
        .collect()
}
