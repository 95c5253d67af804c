use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgeModelError {
    #[error("time and errors cannot be negative (time {total_time_s}s, errors {num_errors})")]
    NegativeInput { total_time_s: f64, num_errors: i64 },
    #[error("total time must be a finite number of seconds, got {0}")]
    NonFiniteTime(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("fixation durations must not be empty")]
    EmptyFixationDurations,
    #[error("repetitions must be at least 1")]
    ZeroRepetitions,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    AgeModel(#[from] AgeModelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
