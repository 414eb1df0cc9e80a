//! Reactive per-order action matrices.
//!
//! Turns the repository's snapshot feed into a stream of view models for
//! the current actor. The actor's aggregate context (global busy state,
//! in-flight application count) is fetched once per observation; every
//! emitted snapshot is then mapped using only data the snapshot already
//! carries, so deriving the matrix costs no repository calls per emission
//! regardless of how many orders are visible.

use super::require_actor;
use crate::{AvailabilityResolver, SessionProvider, StaffingError};
use crew_state::{actions_for, ActionSet, GuardContext};
use crew_storage::OrderRepository;
use crew_types::{Actor, OrderStatus, OrderView, OrdersSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::instrument;

/// Per-order, per-actor view model.
#[derive(Debug, Clone, Serialize)]
pub struct OrderUiModel {
	/// Order this model describes.
	pub order_id: String,
	/// Order title, for display.
	pub title: String,
	/// Current order status.
	pub status: OrderStatus,
	/// Full action-availability matrix for the observing actor,
	/// including displayable disabled-reasons.
	pub actions: ActionSet,
}

impl OrderUiModel {
	pub fn can_apply(&self) -> bool {
		self.actions.apply.allowed
	}

	pub fn can_withdraw(&self) -> bool {
		self.actions.withdraw.allowed
	}

	pub fn can_select(&self) -> bool {
		self.actions.select.allowed
	}

	pub fn can_unselect(&self) -> bool {
		self.actions.unselect.allowed
	}

	pub fn can_start(&self) -> bool {
		self.actions.start.allowed
	}

	pub fn can_cancel(&self) -> bool {
		self.actions.cancel.allowed
	}

	pub fn can_complete(&self) -> bool {
		self.actions.complete.allowed
	}

	pub fn can_open_chat(&self) -> bool {
		self.actions.open_chat.allowed
	}
}

/// Observes the order list as view models for the current actor.
pub struct ObserveOrderUiModelsUseCase {
	repository: Arc<dyn OrderRepository>,
	session: Arc<dyn SessionProvider>,
	availability: Arc<AvailabilityResolver>,
	application_limit: u32,
}

impl ObserveOrderUiModelsUseCase {
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		session: Arc<dyn SessionProvider>,
		availability: Arc<AvailabilityResolver>,
		application_limit: u32,
	) -> Self {
		Self {
			repository,
			session,
			availability,
			application_limit,
		}
	}

	/// Starts observing for the current actor.
	///
	/// The returned stream opens with the current snapshot and re-emits
	/// the full model list on every repository mutation.
	#[instrument(skip_all)]
	pub async fn observe(
		&self,
	) -> Result<impl Stream<Item = Vec<OrderUiModel>> + Send, StaffingError> {
		let actor = require_actor(self.session.as_ref()).await?;

		// One aggregate context per observation, not per emission.
		let actor_busy_on = self
			.availability
			.resolve(std::slice::from_ref(&actor.id))
			.await?
			.remove(&actor.id)
			.and_then(|a| a.active_order_id);
		let in_flight = self
			.repository
			.count_active_applications_for_limit(&actor.id)
			.await
			.map_err(|e| StaffingError::Unknown(e.to_string()))?;

		let updates = BroadcastStream::new(self.repository.observe_orders())
			.filter_map(|emission| emission.ok());
		let initial: OrdersSnapshot = Arc::new(
			self.repository
				.list_orders()
				.await
				.map_err(|e| StaffingError::Unknown(e.to_string()))?,
		);

		let limit = self.application_limit;
		Ok(tokio_stream::once(initial)
			.chain(updates)
			.map(move |snapshot| {
				derive_models(&snapshot, &actor, actor_busy_on.as_deref(), in_flight, limit)
			}))
	}
}

/// Maps one consistent snapshot to the actor's model list.
fn derive_models(
	snapshot: &[OrderView],
	actor: &Actor,
	actor_busy_on: Option<&str>,
	in_flight: u32,
	application_limit: u32,
) -> Vec<OrderUiModel> {
	// The snapshot is the full order list, so the busy map for the
	// select/start guards can be read off its own assignments.
	let busy_elsewhere: HashMap<String, String> = snapshot
		.iter()
		.flat_map(|view| {
			view.active_assignments()
				.map(|a| (a.loader_id.clone(), a.order_id.clone()))
		})
		.collect();

	snapshot
		.iter()
		.map(|view| {
			let ctx = GuardContext {
				actor_busy_on: actor_busy_on.map(str::to_string),
				applications_in_flight: in_flight,
				application_limit,
				busy_elsewhere: busy_elsewhere.clone(),
			};
			OrderUiModel {
				order_id: view.order.id.clone(),
				title: view.order.title.clone(),
				status: view.order.status,
				actions: actions_for(view, actor, &ctx),
			}
		})
		.collect()
}
