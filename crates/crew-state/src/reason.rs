//! Typed refusal reasons produced by the state machine.

use crew_types::{ApplicationStatus, OrderStatus, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a staffing action is not available.
///
/// Expected business refusals are values, not exceptions; the `Display`
/// rendering is short and specific enough to show to a user directly.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum BlockReason {
	/// The actor's role cannot perform this action at all.
	#[error("only a {required} can do this")]
	WrongRole { required: Role },

	/// The action is reserved for the dispatcher who created the order.
	#[error("only the order's creator can do this")]
	NotCreator,

	/// The order is in a terminal status and accepts no further events.
	#[error("order is {status} and accepts no further changes")]
	TerminalStatus { status: OrderStatus },

	/// The event is not defined for the order's current status.
	#[error("not available while the order is {status}")]
	UnsupportedEvent { status: OrderStatus },

	/// The worker already has an application on this order.
	#[error("already applied to this order")]
	AlreadyApplied,

	/// The worker has no in-flight application on this order.
	#[error("no application on this order")]
	NoApplication,

	/// The targeted application is not in the applied status.
	#[error("application is {status}, expected applied")]
	ApplicationNotApplied { status: ApplicationStatus },

	/// The targeted application is not in the selected status.
	#[error("application is {status}, expected selected")]
	ApplicationNotSelected { status: ApplicationStatus },

	/// Every crew slot already has a selected worker.
	#[error("all {required} crew slots are filled")]
	SelectionFull { required: u32 },

	/// There is no selected applicant to unselect.
	#[error("no selected applicants")]
	NothingSelected,

	/// The order cannot start until every slot is filled.
	#[error("only {selected} of {required} workers selected")]
	SelectedCountMismatch { selected: u32, required: u32 },

	/// The worker already holds an active assignment on another order.
	#[error("worker {loader_id} is already assigned to order {order_id}")]
	WorkerBusy { loader_id: String, order_id: String },

	/// The worker has reached the in-flight application limit.
	#[error("application limit of {limit} reached")]
	ApplicationLimitReached { limit: u32 },

	/// The actor is neither the creator nor involved in this order.
	#[error("not a participant of this order")]
	NotParticipant,

	/// The order's exact start time has not passed yet, or it has none.
	#[error("order is not due to expire")]
	ExpiryNotDue,
}
