pub mod scheduler;
pub mod timer;

pub use scheduler::{Scheduler, TimerId};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
