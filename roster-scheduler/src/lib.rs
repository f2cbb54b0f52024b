//! Builds a Sunday ministry roster: who serves in which role each week,
//! under availability and fairness rules, with unfillable slots reported.

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod roster;
pub mod schedule;
pub mod web;

pub use config::{EngineConfig, RecencyMode};
pub use error::{ConfigError, LoadError, ScheduleError};
pub use schedule::{build_schedule, ScheduleBuilder, ScheduleInput, ScheduleOutcome};
