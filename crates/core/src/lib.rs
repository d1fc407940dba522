//! Core domain model for the contentforge pipeline
//!
//! This crate defines the shared blackboard record, the pipeline stage
//! machine, and the worker report types. It has no knowledge of workers,
//! providers, or the orchestration loop.

pub mod domain;
pub mod error;

pub use domain::blackboard::Blackboard;
pub use domain::content::{ComparisonReport, FaqEntry, GeneratedContent};
pub use domain::product::ProductInput;
pub use domain::report::{WorkerReport, WorkerStatus};
pub use domain::stage::{Stage, StageMachine};
pub use error::CoreError;
