//! Batch worker availability resolution.
//!
//! One repository round-trip answers "is this worker busy, and where" for
//! a whole set of worker ids. Used by the start use case's commit-time
//! re-check and by UI aggregation, so neither ever issues one query per
//! worker.

use crate::StaffingError;
use crew_storage::OrderRepository;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Availability of one worker at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponderAvailability {
	/// The worker this record describes.
	pub loader_id: String,
	/// True if the worker holds no active assignment anywhere.
	pub available: bool,
	/// The order the worker is committed to, when busy.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub active_order_id: Option<String>,
}

/// Resolves busy state for sets of workers in a single query.
pub struct AvailabilityResolver {
	repository: Arc<dyn OrderRepository>,
}

impl AvailabilityResolver {
	pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
		Self { repository }
	}

	/// Resolves availability for every given worker id.
	///
	/// Issues exactly one busy-assignments query regardless of the set
	/// size; workers absent from the busy map are available.
	pub async fn resolve(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, ResponderAvailability>, StaffingError> {
		let busy = self
			.repository
			.get_busy_assignments(loader_ids)
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))?;
		Ok(loader_ids
			.iter()
			.map(|loader_id| {
				let active_order_id = busy.get(loader_id).cloned();
				(
					loader_id.clone(),
					ResponderAvailability {
						loader_id: loader_id.clone(),
						available: active_order_id.is_none(),
						active_order_id,
					},
				)
			})
			.collect())
	}

	/// The busy map itself, for callers that need the raw conflict ids.
	pub async fn busy_map(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, String>, StaffingError> {
		self.repository
			.get_busy_assignments(loader_ids)
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))
	}
}
