//! Assignment types for confirmed work on an order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a confirmed assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentStatus {
	/// The worker is committed to this order. A worker holds at most one
	/// active assignment across the whole system.
	Active,
	/// The order completed normally.
	Completed,
	/// The order was canceled while in progress.
	Canceled,
}

impl fmt::Display for AssignmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AssignmentStatus::Active => write!(f, "active"),
			AssignmentStatus::Completed => write!(f, "completed"),
			AssignmentStatus::Canceled => write!(f, "canceled"),
		}
	}
}

/// Confirmed, scheduled work for a specific worker on a specific order.
///
/// Keyed by (order_id, loader_id); created only when an order starts, one
/// per then-selected applicant, and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAssignment {
	/// Order the assignment belongs to.
	pub order_id: String,
	/// Assigned worker.
	pub loader_id: String,
	/// Current assignment status.
	pub status: AssignmentStatus,
	/// Timestamp carried over from the winning application, milliseconds.
	pub assigned_at_millis: u64,
	/// Timestamp the order started, milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub started_at_millis: Option<u64>,
}
