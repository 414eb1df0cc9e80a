//! Staffing state machine for the crew system.
//!
//! This module provides the pure decision core of the engine: given a fully
//! joined order snapshot, an actor, and a handful of facts the snapshot
//! cannot carry (global busy state, in-flight application counts), it decides
//! which staffing events are permitted and what an approved transition
//! logically changes. It never touches storage, never blocks, and reports
//! every refusal as a typed [`BlockReason`] instead of an error path.

mod actions;
mod machine;
mod reason;

pub use actions::{ActionSet, Capability};
pub use machine::{actions_for, transition, GuardContext, OrderEvent, TransitionPlan};
pub use reason::BlockReason;
