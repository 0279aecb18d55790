pub mod policy;
pub mod scheduler;
pub mod window;

pub use policy::{AttemptPolicy, SchedulerConfig};
pub use scheduler::{PassOutcome, PassReport, RetryScheduler};
pub use window::{DueState, ReleaseWindow};
