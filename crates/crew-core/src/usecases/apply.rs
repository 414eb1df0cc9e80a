//! Worker application and withdrawal.

use super::{fetch_order, require_actor};
use crate::{AvailabilityResolver, Clock, SessionProvider, StaffingError};
use crew_state::{transition, GuardContext, OrderEvent};
use crew_storage::OrderRepository;
use crew_types::OrderView;
use std::sync::Arc;
use tracing::instrument;

/// Applies the current worker to a staffing order.
pub struct ApplyToOrderUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	availability: Arc<AvailabilityResolver>,
	application_limit: u32,
}

impl ApplyToOrderUseCase {
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
	pub async fn execute(
		&self,
		order_id: &str,
		rating: Option<f64>,
	) -> Result<OrderView, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		let mut ctx = GuardContext::with_limit(self.application_limit);
		ctx.actor_busy_on = self
			.availability
			.busy_map(std::slice::from_ref(&actor.id))
			.await?
			.remove(&actor.id);
		ctx.applications_in_flight = self
			.repository
			.count_active_applications_for_limit(&actor.id)
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))?;

		let now = self.clock.now_millis();
		transition(&view, &OrderEvent::Apply, &actor, now, &ctx)
			.map_err(StaffingError::from_block)?;

		self.repository
			.apply_to_order(order_id, &actor.id, rating, now)
			.await
			.map_err(|e| StaffingError::from_repository(order_id, e))
	}
}

/// Withdraws the current worker's in-flight application.
pub struct WithdrawApplicationUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	application_limit: u32,
}

impl WithdrawApplicationUseCase {
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

	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn execute(&self, order_id: &str) -> Result<OrderView, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		let now = self.clock.now_millis();
		let ctx = GuardContext::with_limit(self.application_limit);
		transition(&view, &OrderEvent::Withdraw, &actor, now, &ctx)
			.map_err(StaffingError::from_block)?;

		self.repository
			.withdraw_application(order_id, &actor.id, now)
			.await
			.map_err(|e| StaffingError::from_repository(order_id, e))
	}
}
