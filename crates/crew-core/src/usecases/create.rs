//! Order creation.

use super::require_actor;
use crate::{Clock, SessionProvider, StaffingError};
use crew_state::BlockReason;
use crew_storage::OrderRepository;
use crew_types::{OrderDraft, OrderView, Role};
use std::sync::Arc;
use tracing::instrument;

/// Creates a new staffing order from a draft.
///
/// Input is validated before the repository is touched: a blank title,
/// a zero worker requirement, or a pre-staffed count outside
/// `[0, required_workers]` never reach storage.
pub struct CreateOrderUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	clock: Arc<dyn Clock>,
}

impl CreateOrderUseCase {
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		session: Arc<dyn SessionProvider>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			repository,
			session,
			clock,
		}
	}

	#[instrument(skip_all, fields(title = %draft.title))]
	pub async fn execute(&self, draft: OrderDraft) -> Result<OrderView, StaffingError> {
		if draft.title.trim().is_empty() {
			return Err(StaffingError::Validation("title must not be blank".into()));
		}
		if draft.required_workers == 0 {
			return Err(StaffingError::Validation(
				"required_workers must be at least 1".into(),
			));
		}
		if draft.workers_current > draft.required_workers {
			return Err(StaffingError::Validation(format!(
				"workers_current {} exceeds required_workers {}",
				draft.workers_current, draft.required_workers
			)));
		}

		let actor = require_actor(self.session.as_ref()).await?;
		if actor.role != Role::Dispatcher {
			return Err(StaffingError::Authorization(BlockReason::WrongRole {
				required: Role::Dispatcher,
			}));
		}

		self.repository
			.create_order(draft, &actor.id, self.clock.now_millis())
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))
	}
}
