//! Actor types for callers of the staffing engine.
//!
//! Every operation is performed on behalf of an actor resolved from the
//! surrounding session. The engine only distinguishes two roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an actor in the staffing marketplace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Role {
	/// Creates orders and selects among applicants.
	Dispatcher,
	/// Applies to orders and performs the work.
	Worker,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Dispatcher => write!(f, "dispatcher"),
			Role::Worker => write!(f, "worker"),
		}
	}
}

/// An authenticated caller of the engine.
///
/// Resolved by the session provider at the use-case boundary; the engine
/// never stores actors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
	/// Unique identifier of the actor.
	pub id: String,
	/// Role the actor holds for this session.
	pub role: Role,
}

impl Actor {
	/// Creates a dispatcher actor.
	pub fn dispatcher(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			role: Role::Dispatcher,
		}
	}

	/// Creates a worker actor.
	pub fn worker(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			role: Role::Worker,
		}
	}
}
