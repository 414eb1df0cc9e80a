//! Order start.
//!
//! Starting is the commit point of the whole staffing flow and the only
//! place the global exclusivity invariant can be violated by a race, so
//! the check runs twice: the state machine validates role and quorum on
//! the snapshot, then the busy state of exactly the selected workers is
//! re-fetched immediately before the commit. A selection made minutes ago
//! proves nothing; another order may have started in between.

use super::{fetch_order, require_actor};
use crate::{AvailabilityResolver, Clock, SessionProvider, StaffingError};
use crew_state::{transition, GuardContext, OrderEvent};
use crew_storage::{OrderRepository, RepositoryError};
use crew_types::OrderView;
use std::sync::Arc;
use tracing::instrument;

/// Outcome of a start attempt.
#[derive(Debug)]
pub enum StartOutcome {
	/// The order started; assignments are active.
	Started(OrderView),
	/// A selected worker went active on another order first.
	AssigneeAlreadyBusy {
		loader_id: String,
		conflicting_order_id: String,
	},
}

/// Starts a fully staffed order.
pub struct StartOrderUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	availability: Arc<AvailabilityResolver>,
	application_limit: u32,
}

impl StartOrderUseCase {
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		session: Arc<dyn SessionProvider>,
		clock: Arc<dyn Clock>,
		availability: Arc<AvailabilityResolver>,
		application_limit: u32,
	) -> Self {
		Self {
			repository,
			session,
			clock,
			availability,
			application_limit,
		}
	}

	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn execute(&self, order_id: &str) -> Result<StartOutcome, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		// Phase 1: role and quorum on the snapshot.
		let now = self.clock.now_millis();
		let ctx = GuardContext::with_limit(self.application_limit);
		transition(&view, &OrderEvent::Start, &actor, now, &ctx)
			.map_err(StaffingError::from_block)?;

		// Phase 2: authoritative busy re-check for the selected workers,
		// immediately before committing.
		let selected = view.selected_loader_ids();
		let busy = self.availability.busy_map(&selected).await?;
		if let Some((loader_id, conflicting)) =
			busy.iter().find(|(_, active)| active.as_str() != order_id)
		{
			return Ok(StartOutcome::AssigneeAlreadyBusy {
				loader_id: loader_id.clone(),
				conflicting_order_id: conflicting.clone(),
			});
		}

		match self.repository.start_order(order_id, now).await {
			Ok(view) => Ok(StartOutcome::Started(view)),
			// The window between the re-check and the commit is not
			// empty; the repository refuses under its own lock.
			Err(RepositoryError::Exclusivity {
				loader_id,
				order_id,
			}) => Ok(StartOutcome::AssigneeAlreadyBusy {
				loader_id,
				conflicting_order_id: order_id,
			}),
			Err(e) => Err(StaffingError::from_repository(order_id, e)),
		}
	}
}
