pub mod availability;
pub mod config;
pub mod execution;
pub mod identity;
pub mod metrics;
pub mod planner;
pub mod platform;
pub mod schedule;
pub mod scheduler;

pub mod error;
pub mod serde_helpers;
pub mod time;
