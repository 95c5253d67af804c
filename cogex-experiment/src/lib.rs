pub mod age;
pub mod config;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod state;
pub mod task;
pub use config::{ExperimentConfig, ReactionTimeConfig, StroopConfig};
pub use error::{AgeModelError, ConfigError, ExperimentError};
pub use metrics::{ConditionMetrics, PerformanceMetrics, StroopPerformanceMetrics};
pub use state::{
    EventFor, ExperimentEvent, ExperimentState, ExperimentStateMachine, FeedbackKind, ResponseOf,
};
pub use task::{ReactionTimeTask, StroopTask, Task};
