//! Per-order action availability.

use crate::BlockReason;
use serde::{Deserialize, Serialize};

/// Whether one action is available, and why not if it isn't.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Capability {
	/// True if the action would currently pass the guards.
	pub allowed: bool,
	/// The refusal reason when `allowed` is false.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<BlockReason>,
}

impl Capability {
	/// An available action.
	pub fn allowed() -> Self {
		Self {
			allowed: true,
			reason: None,
		}
	}

	/// A blocked action with its reason.
	pub fn blocked(reason: BlockReason) -> Self {
		Self {
			allowed: false,
			reason: Some(reason),
		}
	}

	/// Human-readable refusal text, if blocked.
	pub fn reason_text(&self) -> Option<String> {
		self.reason.as_ref().map(|r| r.to_string())
	}
}

impl From<Result<(), BlockReason>> for Capability {
	fn from(guard: Result<(), BlockReason>) -> Self {
		match guard {
			Ok(()) => Capability::allowed(),
			Err(reason) => Capability::blocked(reason),
		}
	}
}

/// The full action-availability matrix for one order and one actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSet {
	pub apply: Capability,
	pub withdraw: Capability,
	pub select: Capability,
	pub unselect: Capability,
	pub start: Capability,
	pub cancel: Capability,
	pub complete: Capability,
	pub open_chat: Capability,
}
