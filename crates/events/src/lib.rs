//! Event system for the contentforge pipeline
//!
//! This crate provides the fire-and-forget event bus and the typed event
//! records emitted on every pipeline transition. It carries no control-flow
//! responsibility; subscribers observe, they never steer.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
