//! Linear age estimate from Stroop completion time and errors.
//!
//! `age = 21.36 + 0.11 * seconds + 3.66 * errors + adjustment(difficulty)`,
//! floored at the youngest age in the reference sample.

use crate::error::AgeModelError;
use cogex_core::Difficulty;
use std::fmt;

pub const INTERCEPT: f64 = 21.36;
pub const TIME_COEFF: f64 = 0.11;
pub const ERROR_COEFF: f64 = 3.66;
pub const MIN_AGE: f64 = 15.0;

/// Assumed seconds per trial when only an error count is known
pub const ESTIMATED_SECONDS_PER_TRIAL: f64 = 1.5;
pub const DEFAULT_TRIAL_COUNT: usize = 36;

pub fn difficulty_adjustment(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.0,
        Difficulty::Hard => -2.5,
    }
}

pub fn predict_age(
    total_time_s: f64,
    num_errors: i64,
    difficulty: Difficulty,
) -> Result<f64, AgeModelError> {
    if total_time_s.is_nan() || total_time_s == f64::INFINITY {
        return Err(AgeModelError::NonFiniteTime(total_time_s));
    }
    if total_time_s < 0.0 || num_errors < 0 {
        return Err(AgeModelError::NegativeInput {
            total_time_s,
            num_errors,
        });
    }

    let prediction = INTERCEPT
        + TIME_COEFF * total_time_s
        + ERROR_COEFF * num_errors as f64
        + difficulty_adjustment(difficulty);

    Ok(prediction.max(MIN_AGE))
}

/// Fallback when no timing is available: assumes an easy run at a typical pace
pub fn predict_from_errors(num_errors: i64, total_trials: usize) -> Result<f64, AgeModelError> {
    let total_time_s = ESTIMATED_SECONDS_PER_TRIAL * total_trials as f64;
    predict_age(total_time_s, num_errors, Difficulty::Easy)
}

/// Human readable form of the model for a difficulty
#[derive(Debug, Clone, Copy)]
pub struct Equation(pub Difficulty);

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Age = {INTERCEPT} + ({TIME_COEFF} × Time) + ({ERROR_COEFF} × Errors)"
        )?;
        let adj = difficulty_adjustment(self.0);
        if adj != 0.0 {
            write!(f, " + ({adj})")?;
        }
        Ok(())
    }
}

pub fn equation(difficulty: Difficulty) -> String {
    Equation(difficulty).to_string()
}
