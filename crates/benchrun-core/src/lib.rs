//! Benchmark run orchestration.
//!
//! Given a benchmark name and raw user parameters, this crate expands the
//! parameters into a deterministic plan of iterations and samples, executes
//! that plan either live (sequential, fail-fast) or in replay mode (bulk
//! post-processing with background jobs), and assembles the JSON run,
//! iteration, and configuration documents describing what was executed.
//!
//! The workload itself is never run in-process: parameter expansion, sample
//! execution, telemetry lifecycle, and configuration harvesting are external
//! collaborators behind the traits in [`services`].

pub mod config;
pub mod docs;
pub mod engine;
pub mod errors;
pub mod layout;
pub mod params;
pub mod plan;
pub mod services;

pub use config::{Config, PostprocessMode};
pub use engine::{Coordinator, InterruptFlag, RunOutcome};
pub use errors::RunError;
