use crate::stroop::Congruence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines stimuli and how a response to them is scored
pub trait Stimulus: Clone + Send + Sync + fmt::Debug {
    /// What a participant hands back while the stimulus is visible
    type Response: Clone + PartialEq + Send + Sync + fmt::Debug + fmt::Display;

    fn correct_response(&self) -> Self::Response;

    fn is_correct(&self, response: &Self::Response) -> bool {
        *response == self.correct_response()
    }

    /// Short human readable description, used for logs and exports
    fn label(&self) -> String;

    /// Congruence family for tasks that have one
    fn family(&self) -> Option<Congruence> {
        None
    }

    /// Finer-grained condition tag written into exported results
    fn condition_tag(&self) -> Option<&'static str> {
        None
    }
}

/// A key identifier, stored lower-cased so comparisons ignore case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self(c.to_lowercase().collect())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coloured patch shown in the two-choice reaction-time task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPatch {
    Blue,
    Orange,
}

impl ColorPatch {
    /// The fixed base set every reaction-time session repeats
    pub const BASE_SET: [ColorPatch; 2] = [ColorPatch::Blue, ColorPatch::Orange];

    pub fn correct_key(&self) -> char {
        match self {
            ColorPatch::Blue => 'f',
            ColorPatch::Orange => 'j',
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ColorPatch::Blue => "#4A90E2",
            ColorPatch::Orange => "#F5A623",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorPatch::Blue => "blue",
            ColorPatch::Orange => "orange",
        }
    }
}

impl Stimulus for ColorPatch {
    type Response = Key;

    fn correct_response(&self) -> Key {
        Key::from(self.correct_key())
    }

    fn is_correct(&self, response: &Key) -> bool {
        let mut expected = [0u8; 4];
        response
            .as_str()
            .eq_ignore_ascii_case(self.correct_key().encode_utf8(&mut expected))
    }

    fn label(&self) -> String {
        self.name().to_string()
    }
}
