//! Expiry sweep.

use crate::{Clock, StaffingError};
use crew_storage::OrderRepository;
use std::sync::Arc;
use tracing::instrument;

/// Sweeps staffing orders whose exact start time has passed into expired.
///
/// A system operation: it needs no actor and an empty sweep is a success.
pub struct RefreshOrdersUseCase {
	repository: Arc<dyn OrderRepository>,
	clock: Arc<dyn Clock>,
}

impl RefreshOrdersUseCase {
	pub fn new(repository: Arc<dyn OrderRepository>, clock: Arc<dyn Clock>) -> Self {
		Self { repository, clock }
	}

	#[instrument(skip_all)]
	pub async fn execute(&self) -> Result<usize, StaffingError> {
		let expired = self
			.repository
			.refresh(self.clock.now_millis())
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))?;
		if expired > 0 {
			tracing::info!(expired, "Expired staffing orders past their start time");
		}
		Ok(expired)
	}
}
