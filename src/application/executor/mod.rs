//! # Plan Executor
//!
//! The agent side of ARDF: discover what a server offers, plan against the
//! goal, then run the plan step by step.
//!
//! - `discovery` reads the index, or synthesizes one from the listings
//! - `heuristics` guesses tool arguments from the goal text
//! - `runner` executes tools and prompts and records every step
//!
//! A failed step never aborts the run unless [`StepFailurePolicy::Abort`]
//! is configured; its error is kept in the [`RunReport`].

mod discovery;
mod errors;
mod heuristics;
mod models;
mod runner;


pub use discovery::{Discovery, DiscoveryError, discover, list_capabilities, read_index};
pub use errors::{ExecutorError, StepError};
pub use heuristics::{ToolArguments, infer_tool_arguments};
pub use models::{
    ExecutorOptions, IndexSource, RunEntry, RunReport, StepFailurePolicy, StepKind,
};
pub use runner::PlanExecutor;
