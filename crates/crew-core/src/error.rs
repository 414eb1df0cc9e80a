//! Use-case boundary errors.
//!
//! The state machine reports refusals as [`BlockReason`] values; the use
//! cases fold those, repository failures, and input validation into this
//! single taxonomy. Nothing below this boundary panics its way out: a
//! repository failure becomes `Unknown`, a missing session actor becomes
//! `NoActor`, and every variant renders a short displayable message.

use crew_state::BlockReason;
use crew_storage::RepositoryError;
use thiserror::Error;

/// Failure of a staffing operation, ready for display.
#[derive(Debug, Error)]
pub enum StaffingError {
	/// The input was malformed before any guard ran.
	#[error("validation failed: {0}")]
	Validation(String),
	/// The actor's role or identity does not permit the operation.
	#[error("not authorized: {0}")]
	Authorization(BlockReason),
	/// The event is invalid for the order's current state.
	#[error("not allowed: {0}")]
	State(BlockReason),
	/// The global exclusivity invariant would be violated.
	#[error("worker {loader_id} is already assigned to order {order_id}")]
	Conflict { loader_id: String, order_id: String },
	/// No order with the given id exists.
	#[error("order not found: {0}")]
	NotFound(String),
	/// The session has no actor selected.
	#[error("no actor selected in the current session")]
	NoActor,
	/// An unexpected repository failure, wrapped.
	#[error("unexpected failure: {0}")]
	Unknown(String),
}

impl StaffingError {
	/// Folds a state-machine refusal into the taxonomy.
	pub fn from_block(reason: BlockReason) -> Self {
		match reason {
			BlockReason::WrongRole { .. } | BlockReason::NotCreator => {
				StaffingError::Authorization(reason)
			}
			BlockReason::WorkerBusy {
				loader_id,
				order_id,
			} => StaffingError::Conflict {
				loader_id,
				order_id,
			},
			other => StaffingError::State(other),
		}
	}

	/// Folds a repository failure into the taxonomy.
	///
	/// `order_id` names the order the operation targeted, for the
	/// not-found rendering.
	pub fn from_repository(order_id: &str, err: RepositoryError) -> Self {
		match err {
			RepositoryError::NotFound => StaffingError::NotFound(order_id.to_string()),
			RepositoryError::Exclusivity {
				loader_id,
				order_id,
			} => StaffingError::Conflict {
				loader_id,
				order_id,
			},
			other => StaffingError::Unknown(other.to_string()),
		}
	}
}
