use contentforge_core::Blackboard;

use crate::worker::Worker;

/// First registered worker whose `can_handle` matches the board.
///
/// Registration order is the only tie-break: given the same board and the
/// same worker list this always returns the same worker.
pub fn select_next<'a>(
    workers: &'a [Box<dyn Worker>],
    board: &Blackboard,
) -> Option<&'a dyn Worker> {
    workers
        .iter()
        .find(|worker| worker.can_handle(board))
        .map(|worker| worker.as_ref())
}
