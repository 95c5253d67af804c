pub mod phase;
pub mod stimulus;
pub mod stroop;
pub mod trial;

pub use phase::Phase;
pub use stimulus::{ColorPatch, Key, Stimulus};
pub use stroop::{
    Background, Condition, Congruence, Difficulty, InkColor, StroopStimulus, TaskRule, stroop_pool,
};
pub use trial::{Outcome, Trial, TrialResult};
