//! Batch responder availability.

use crate::{AvailabilityResolver, ResponderAvailability, StaffingError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Resolves availability records for a set of worker ids.
///
/// Issues exactly one busy-assignments query for the whole set; callers
/// aggregating applicant lists must use this instead of querying one
/// worker at a time.
pub struct GetRespondersWithAvailabilityUseCase {
	availability: Arc<AvailabilityResolver>,
}

impl GetRespondersWithAvailabilityUseCase {
	pub fn new(availability: Arc<AvailabilityResolver>) -> Self {
		Self { availability }
	}

	#[instrument(skip_all, fields(count = loader_ids.len()))]
	pub async fn execute(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, ResponderAvailability>, StaffingError> {
		self.availability.resolve(loader_ids).await
	}
}
