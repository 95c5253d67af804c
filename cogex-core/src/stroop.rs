use crate::stimulus::Stimulus;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four response colours, in button order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl InkColor {
    pub const ALL: [InkColor; 4] = [
        InkColor::Red,
        InkColor::Blue,
        InkColor::Green,
        InkColor::Yellow,
    ];

    /// Index of the response button showing this colour
    pub fn index(&self) -> usize {
        match self {
            InkColor::Red => 0,
            InkColor::Blue => 1,
            InkColor::Green => 2,
            InkColor::Yellow => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            InkColor::Red => "red",
            InkColor::Blue => "blue",
            InkColor::Green => "green",
            InkColor::Yellow => "yellow",
        }
    }

    pub fn word(&self) -> &'static str {
        match self {
            InkColor::Red => "RED",
            InkColor::Blue => "BLUE",
            InkColor::Green => "GREEN",
            InkColor::Yellow => "YELLOW",
        }
    }

    /// Display colour; yellow is darkened for contrast on white
    pub fn css(&self) -> &'static str {
        match self {
            InkColor::Red => "red",
            InkColor::Blue => "blue",
            InkColor::Green => "green",
            InkColor::Yellow => "#DAA520",
        }
    }
}

/// Background behind the word in the hard version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Black,
    Grey,
}

impl Background {
    pub fn rule(&self) -> TaskRule {
        match self {
            Background::Black => TaskRule::Word,
            Background::Grey => TaskRule::InkColor,
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            Background::Black => "black",
            Background::Grey => "grey",
        }
    }
}

/// Which attribute of the stimulus the participant must report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRule {
    InkColor,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Congruence {
    Congruent,
    Incongruent,
}

/// Condition tag as reported to the participant-facing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Congruent,
    Incongruent,
    WordCongruent,
    WordIncongruent,
    ColorCongruent,
    ColorIncongruent,
}

impl Condition {
    pub fn family(&self) -> Congruence {
        match self {
            Condition::Congruent | Condition::WordCongruent | Condition::ColorCongruent => {
                Congruence::Congruent
            }
            Condition::Incongruent | Condition::WordIncongruent | Condition::ColorIncongruent => {
                Congruence::Incongruent
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Congruent => "congruent",
            Condition::Incongruent => "incongruent",
            Condition::WordCongruent => "word_congruent",
            Condition::WordIncongruent => "word_incongruent",
            Condition::ColorCongruent => "color_congruent",
            Condition::ColorIncongruent => "color_incongruent",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty `{other}`, expected easy or hard")),
        }
    }
}

/// One Stroop item. Family and rule are fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StroopStimulus {
    pub word: InkColor,
    pub ink: InkColor,
    pub background: Option<Background>,
    pub rule: TaskRule,
    pub family: Congruence,
    pub correct_response: usize,
}

impl StroopStimulus {
    pub fn new(word: InkColor, ink: InkColor, background: Option<Background>) -> Self {
        let rule = background.map_or(TaskRule::InkColor, |b| b.rule());
        let family = if word == ink {
            Congruence::Congruent
        } else {
            Congruence::Incongruent
        };
        let correct_response = match rule {
            TaskRule::InkColor => ink.index(),
            TaskRule::Word => word.index(),
        };
        Self {
            word,
            ink,
            background,
            rule,
            family,
            correct_response,
        }
    }

    pub fn condition(&self) -> Condition {
        match (self.background, self.rule, self.family) {
            (None, _, Congruence::Congruent) => Condition::Congruent,
            (None, _, Congruence::Incongruent) => Condition::Incongruent,
            (Some(_), TaskRule::Word, Congruence::Congruent) => Condition::WordCongruent,
            (Some(_), TaskRule::Word, Congruence::Incongruent) => Condition::WordIncongruent,
            (Some(_), TaskRule::InkColor, Congruence::Congruent) => Condition::ColorCongruent,
            (Some(_), TaskRule::InkColor, Congruence::Incongruent) => Condition::ColorIncongruent,
        }
    }
}

impl Stimulus for StroopStimulus {
    type Response = usize;

    fn correct_response(&self) -> usize {
        self.correct_response
    }

    fn label(&self) -> String {
        match self.background {
            Some(bg) => format!("{} in {} on {}", self.word.word(), self.ink.name(), bg.css()),
            None => format!("{} in {}", self.word.word(), self.ink.name()),
        }
    }

    fn family(&self) -> Option<Congruence> {
        Some(self.family)
    }

    fn condition_tag(&self) -> Option<&'static str> {
        Some(self.condition().as_str())
    }
}

const CONGRUENT_COPIES: usize = 3;
const EASY_INCONGRUENT_COPIES: usize = 2;

/// Every colour as a congruent item `copies` times, every mismatched pair `pair_copies` times
fn block(background: Option<Background>, copies: usize, pair_copies: usize) -> Vec<StroopStimulus> {
    let mut items = Vec::new();
    for color in InkColor::ALL {
        for _ in 0..copies {
            items.push(StroopStimulus::new(color, color, background));
        }
    }
    for word in InkColor::ALL {
        for ink in InkColor::ALL.into_iter().filter(|&ink| ink != word) {
            for _ in 0..pair_copies {
                items.push(StroopStimulus::new(word, ink, background));
            }
        }
    }
    items
}

lazy_static! {
    static ref EASY_POOL: Vec<StroopStimulus> =
        block(None, CONGRUENT_COPIES, EASY_INCONGRUENT_COPIES);
    static ref HARD_POOL: Vec<StroopStimulus> = {
        let mut pool = block(Some(Background::Black), CONGRUENT_COPIES, 1);
        pool.extend(block(Some(Background::Grey), CONGRUENT_COPIES, 1));
        pool
    };
}

/// Fixed stimulus pool for a difficulty
pub fn stroop_pool(difficulty: Difficulty) -> &'static [StroopStimulus] {
    match difficulty {
        Difficulty::Easy => &EASY_POOL,
        Difficulty::Hard => &HARD_POOL,
    }
}
