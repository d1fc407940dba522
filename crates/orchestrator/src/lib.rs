//! Pipeline orchestration
//!
//! A single-threaded engine drives a set of [`Worker`]s over a shared
//! [`Blackboard`](contentforge_core::Blackboard). Each iteration the engine
//! picks the first registered worker whose `can_handle` matches the board,
//! runs it, and reacts to its report: validation failures re-enter the
//! drafting stage with feedback (bounded), errors end the run, and a board
//! no worker wants is advanced once before being declared stuck.

mod engine;
mod error;
mod selector;
mod worker;
pub mod workers;

pub use engine::{EngineConfig, PipelineEngine, RunOutcome};
pub use error::{FailureKind, RunFailure};
pub use selector::select_next;
pub use worker::Worker;
