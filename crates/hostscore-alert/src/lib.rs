//! Host health evaluation and scoring.
//!
//! For one host and time window the engine takes the latest sample, derives
//! the usage rates, resolves the effective alert rules (global rules minus
//! those overridden by host-specific ones) and evaluates each condition.
//! The resulting alerts are classified into five dimensions and turned into
//! a deduction-based [`scoring::MachineScore`]; many scores reduce into a
//! [`summary::FleetSummary`].
//!
//! Storage is reached only through the `hostscore-storage` traits, so every
//! function here is synchronous and safe to call from blocking worker
//! threads.

pub mod condition;
pub mod derived;
pub mod engine;
pub mod error;
pub mod fields;
pub mod materialize;
pub mod resolver;
pub mod scoring;
pub mod summary;
pub mod validation;


pub use engine::{AlertFilter, FleetReport, HealthEngine, HostOverview};
pub use error::{EvalError, RuleError};
pub use scoring::{DimensionScore, MachineScore};
pub use summary::FleetSummary;
