//! Application types for workers responding to orders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a worker's application on an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationStatus {
	/// Submitted and awaiting a dispatcher decision.
	Applied,
	/// Picked by the dispatcher for the order's crew.
	Selected,
	/// Passed over when the order started.
	Rejected,
	/// Withdrawn by the worker.
	Withdrawn,
}

impl ApplicationStatus {
	/// Returns true while the application still counts against the
	/// worker's in-flight limit.
	pub fn is_in_flight(&self) -> bool {
		matches!(self, ApplicationStatus::Applied | ApplicationStatus::Selected)
	}
}

impl fmt::Display for ApplicationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApplicationStatus::Applied => write!(f, "applied"),
			ApplicationStatus::Selected => write!(f, "selected"),
			ApplicationStatus::Rejected => write!(f, "rejected"),
			ApplicationStatus::Withdrawn => write!(f, "withdrawn"),
		}
	}
}

/// A worker's request to be considered for an order.
///
/// Keyed by (order_id, loader_id); created once by APPLY and mutated in
/// status only. Applications are never deleted; they are the staffing
/// history of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderApplication {
	/// Order the application belongs to.
	pub order_id: String,
	/// Worker who applied.
	pub loader_id: String,
	/// Current application status.
	pub status: ApplicationStatus,
	/// Timestamp the application was submitted, milliseconds.
	pub applied_at_millis: u64,
	/// Worker rating snapshot taken at application time.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rating: Option<f64>,
}
