//! Order types for the staffing system.
//!
//! This module defines the order entity, its lifecycle statuses, the
//! scheduling model, and the draft used at creation time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Scheduling information for an order.
///
/// Orders are either pinned to an exact start time or advertised as
/// starting "soon", which is resolved from metadata by the caller and
/// never participates in automatic expiry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Schedule {
	/// The order starts at a known timestamp.
	Exact {
		/// Unix timestamp in milliseconds.
		starts_at_millis: u64,
	},
	/// The order starts as soon as it is staffed.
	Soon,
}

impl Schedule {
	/// Returns the exact start time, if one is set.
	pub fn starts_at_millis(&self) -> Option<u64> {
		match self {
			Schedule::Exact { starts_at_millis } => Some(*starts_at_millis),
			Schedule::Soon => None,
		}
	}
}

/// Status of an order in the staffing system.
///
/// `Completed`, `Canceled`, and `Expired` are terminal: no event is
/// accepted on an order in one of those statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Workers may apply and the dispatcher selects among them.
	Staffing,
	/// Work has started; assignments are active.
	InProgress,
	/// Work finished normally.
	Completed,
	/// The order was canceled by its creator.
	Canceled,
	/// The scheduled start time passed while still staffing.
	Expired,
}

impl OrderStatus {
	/// Returns true if no further events are accepted in this status.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			OrderStatus::Completed | OrderStatus::Canceled | OrderStatus::Expired
		)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Staffing => write!(f, "staffing"),
			OrderStatus::InProgress => write!(f, "inProgress"),
			OrderStatus::Completed => write!(f, "completed"),
			OrderStatus::Canceled => write!(f, "canceled"),
			OrderStatus::Expired => write!(f, "expired"),
		}
	}
}

/// A work order owned by the repository.
///
/// The engine treats an order as a value it reads and requests mutations
/// on; fields change only through state-machine-approved transitions
/// applied by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier, assigned by the repository on creation.
	pub id: String,
	/// Short human-readable title.
	pub title: String,
	/// Address where the work takes place.
	pub address: String,
	/// Offered pay per hour.
	pub price_per_hour: Decimal,
	/// When the work starts.
	pub schedule: Schedule,
	/// Expected duration in minutes.
	pub duration_minutes: u32,
	/// Number of workers that must be selected before the order can start.
	pub required_workers: u32,
	/// Workers already staffed outside the platform at creation time.
	pub workers_current: u32,
	/// Ordered list of tags describing the work.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Free-form metadata; ordering is irrelevant.
	#[serde(default)]
	pub metadata: HashMap<String, String>,
	/// Optional comment from the creator.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Reason supplied when the order was canceled.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cancel_reason: Option<String>,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Id of the dispatcher who created the order.
	pub created_by: String,
	/// Timestamp when this order was created, milliseconds.
	pub created_at_millis: u64,
	/// Timestamp when this order was last updated, milliseconds.
	pub updated_at_millis: u64,
}

/// Input for creating a new order.
///
/// Validated by the create use case before it reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
	/// Short human-readable title.
	pub title: String,
	/// Address where the work takes place.
	pub address: String,
	/// Offered pay per hour.
	pub price_per_hour: Decimal,
	/// When the work starts.
	pub schedule: Schedule,
	/// Expected duration in minutes.
	pub duration_minutes: u32,
	/// Number of workers required to start.
	pub required_workers: u32,
	/// Workers already staffed outside the platform.
	#[serde(default)]
	pub workers_current: u32,
	/// Ordered list of tags describing the work.
	#[serde(default)]
	pub tags: Vec<String>,
	/// Free-form metadata.
	#[serde(default)]
	pub metadata: HashMap<String, String>,
	/// Optional comment from the creator.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}
