//! Command surface exposed to the presentation layer.
//!
//! The orchestrator accepts exactly this closed command set; nothing else
//! reaches the use cases. Commands carry the actor-independent payload;
//! the acting identity is resolved from the session at dispatch time.

use crate::{OrderDraft, OrderView};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A staffing command for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
	/// Sweep staffing orders whose exact start time has passed into expired.
	Refresh,
	/// Create a new order from a draft.
	Create { draft: OrderDraft },
	/// Apply to an order as the current worker.
	Apply {
		order_id: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		rating: Option<f64>,
	},
	/// Withdraw the current worker's application.
	Withdraw { order_id: String },
	/// Select an applicant for the order's crew.
	Select { order_id: String, loader_id: String },
	/// Return a selected applicant to the applicant pool.
	Unselect { order_id: String, loader_id: String },
	/// Start a fully staffed order.
	Start { order_id: String },
	/// Cancel an order, optionally with a reason.
	Cancel {
		order_id: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		reason: Option<String>,
	},
	/// Complete an in-progress order.
	Complete { order_id: String },
}

impl Command {
	/// Short name used in dispatch logging.
	pub fn name(&self) -> &'static str {
		match self {
			Command::Refresh => "refresh",
			Command::Create { .. } => "create",
			Command::Apply { .. } => "apply",
			Command::Withdraw { .. } => "withdraw",
			Command::Select { .. } => "select",
			Command::Unselect { .. } => "unselect",
			Command::Start { .. } => "start",
			Command::Cancel { .. } => "cancel",
			Command::Complete { .. } => "complete",
		}
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// Successful outcome of a dispatched command.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
	/// The mutation went through; the fresh order snapshot is returned.
	Order(OrderView),
	/// The target worker already holds an active assignment elsewhere.
	WorkerBusy {
		loader_id: String,
		order_id: String,
	},
	/// The expiry sweep ran; `expired` orders were swept.
	Refreshed { expired: usize },
}
