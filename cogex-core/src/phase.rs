use serde::{Deserialize, Serialize};
use std::fmt;

/// Session phases shared by both tasks.
///
/// `Difficulty` only occurs in tasks that ask for a difficulty before the
/// instructions, `Feedback` only in tasks that show per-trial feedback.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Welcome,
    Difficulty,
    Instructions,
    Fixation,
    Stimulus,
    Feedback,
    Results,
}

impl Phase {
    /// Only a visible stimulus accepts responses
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Stimulus)
    }

    pub fn is_welcome(&self) -> bool {
        matches!(self, Self::Welcome)
    }

    /// Phases that belong to the running trial loop
    pub fn is_trial(&self) -> bool {
        matches!(self, Self::Fixation | Self::Stimulus | Self::Feedback)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Results)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Difficulty => "difficulty",
            Self::Instructions => "instructions",
            Self::Fixation => "fixation",
            Self::Stimulus => "stimulus",
            Self::Feedback => "feedback",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
