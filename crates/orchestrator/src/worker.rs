use async_trait::async_trait;
use contentforge_core::{Blackboard, WorkerReport};

/// Capability contract every pipeline worker implements.
///
/// `can_handle` must be a pure predicate over the board with no side
/// effects; the selector may call it any number of times. `run` owns the
/// board mutably for the duration of the call and is responsible for
/// advancing the stage when it completes its work.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Worker name used in reports, history and events
    fn name(&self) -> &str;

    /// Whether this worker applies to the board in its current state
    fn can_handle(&self, board: &Blackboard) -> bool;

    /// Execute against the board and report the outcome
    async fn run(&self, board: &mut Blackboard) -> WorkerReport;
}
