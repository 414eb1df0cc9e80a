//! Applicant selection and unselection.

use super::{fetch_order, require_actor};
use crate::{AvailabilityResolver, Clock, SessionProvider, StaffingError};
use crew_state::{transition, BlockReason, GuardContext, OrderEvent};
use crew_storage::{OrderRepository, RepositoryError};
use crew_types::OrderView;
use std::sync::Arc;
use tracing::instrument;

/// Outcome of a selection attempt.
#[derive(Debug)]
pub enum SelectOutcome {
	/// The applicant was selected; the fresh order view is returned.
	Selected(OrderView),
	/// The target worker already holds an active assignment elsewhere.
	///
	/// This is the fail-fast half of the two-tier exclusivity strategy:
	/// the dispatcher learns about the conflict at selection time instead
	/// of at start time.
	AlreadyAssigned {
		loader_id: String,
		order_id: String,
	},
}

/// Selects an applicant into the order's crew.
pub struct SelectApplicantUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	availability: Arc<AvailabilityResolver>,
	application_limit: u32,
}

impl SelectApplicantUseCase {
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

	#[instrument(skip_all, fields(order_id = %order_id, loader_id = %loader_id))]
	pub async fn execute(
		&self,
		order_id: &str,
		loader_id: &str,
	) -> Result<SelectOutcome, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		let target = [loader_id.to_string()];
		let mut ctx = GuardContext::with_limit(self.application_limit);
		ctx.busy_elsewhere = self.availability.busy_map(&target).await?;

		let now = self.clock.now_millis();
		let event = OrderEvent::Select {
			loader_id: loader_id.to_string(),
		};
		match transition(&view, &event, &actor, now, &ctx) {
			Ok(_) => {}
			Err(BlockReason::WorkerBusy {
				loader_id,
				order_id,
			}) => {
				return Ok(SelectOutcome::AlreadyAssigned {
					loader_id,
					order_id,
				})
			}
			Err(reason) => return Err(StaffingError::from_block(reason)),
		}

		match self
			.repository
			.select_applicant(order_id, loader_id, now)
			.await
		{
			Ok(view) => Ok(SelectOutcome::Selected(view)),
			// Lost the race to another order's start between the check
			// above and the commit.
			Err(RepositoryError::Exclusivity {
				loader_id,
				order_id,
			}) => Ok(SelectOutcome::AlreadyAssigned {
				loader_id,
				order_id,
			}),
			Err(e) => Err(StaffingError::from_repository(order_id, e)),
		}
	}
}

/// Returns a selected applicant to the applicant pool.
pub struct UnselectApplicantUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	application_limit: u32,
}

impl UnselectApplicantUseCase {
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		session: Arc<dyn SessionProvider>,
		clock: Arc<dyn Clock>,
		application_limit: u32,
	) -> Self {
		Self {
			repository,
			session,
			clock,
			application_limit,
		}
	}

	#[instrument(skip_all, fields(order_id = %order_id, loader_id = %loader_id))]
	pub async fn execute(
		&self,
		order_id: &str,
		loader_id: &str,
	) -> Result<OrderView, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		let now = self.clock.now_millis();
		let ctx = GuardContext::with_limit(self.application_limit);
		let event = OrderEvent::Unselect {
			loader_id: loader_id.to_string(),
		};
		transition(&view, &event, &actor, now, &ctx).map_err(StaffingError::from_block)?;

		self.repository
			.unselect_applicant(order_id, loader_id, now)
			.await
			.map_err(|e| StaffingError::from_repository(order_id, e))
	}
}
