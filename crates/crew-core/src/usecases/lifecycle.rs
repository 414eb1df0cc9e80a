//! Order cancelation and completion.

use super::{fetch_order, require_actor};
use crate::{Clock, SessionProvider, StaffingError};
use crew_state::{transition, GuardContext, OrderEvent};
use crew_storage::OrderRepository;
use crew_types::OrderView;
use std::sync::Arc;
use tracing::instrument;

/// Cancels an order, cascading its active assignments.
pub struct CancelOrderUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	application_limit: u32,
}

impl CancelOrderUseCase {
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
	pub async fn execute(
		&self,
		order_id: &str,
		reason: Option<String>,
	) -> Result<OrderView, StaffingError> {
		// A reason may be omitted entirely, but a provided one must say
		// something. Checked before any guard runs.
		if reason.as_deref().is_some_and(|r| r.trim().is_empty()) {
			return Err(StaffingError::Validation(
				"cancellation reason must not be blank".into(),
			));
		}

		let actor = require_actor(self.session.as_ref()).await?;
		let view = fetch_order(self.repository.as_ref(), order_id).await?;

		let now = self.clock.now_millis();
		let ctx = GuardContext::with_limit(self.application_limit);
		transition(&view, &OrderEvent::Cancel, &actor, now, &ctx)
			.map_err(StaffingError::from_block)?;

		self.repository
			.cancel_order(order_id, reason, now)
			.await
			.map_err(|e| StaffingError::from_repository(order_id, e))
	}
}

/// Completes an in-progress order.
///
/// Permitted to the creating dispatcher or to a worker holding an active
/// assignment on the order.
pub struct CompleteOrderUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
	application_limit: u32,
}

impl CompleteOrderUseCase {
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
		transition(&view, &OrderEvent::Complete, &actor, now, &ctx)
			.map_err(StaffingError::from_block)?;

		self.repository
			.complete_order(order_id, now)
			.await
			.map_err(|e| StaffingError::from_repository(order_id, e))
	}
}
