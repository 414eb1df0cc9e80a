//! In-memory repository backend for the staffing system.
//!
//! All mutations run under a single write lock, which linearizes them
//! globally (strictly stronger than the per-order guarantee the contract
//! asks for) and makes every multi-entity commit atomic. The snapshot
//! published to observers is built while the lock is still held, so each
//! emission is a consistent join of orders, applications, and assignments.

use crate::{OrderRepository, RepositoryError, RepositoryState};
use async_trait::async_trait;
use crew_types::{
	ApplicationStatus, AssignmentStatus, Order, OrderApplication, OrderAssignment, OrderDraft,
	OrderStatus, OrderView, OrdersSnapshot,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Capacity of the snapshot feed before slow observers start lagging.
const FEED_CAPACITY: usize = 256;

/// Mutable store guarded by the repository lock.
#[derive(Debug, Default)]
struct Store {
	orders: HashMap<String, Order>,
	applications: Vec<OrderApplication>,
	assignments: Vec<OrderAssignment>,
}

impl Store {
	/// Joins one order with its applications and assignments.
	fn view_of(&self, order: &Order) -> OrderView {
		let mut applications: Vec<OrderApplication> = self
			.applications
			.iter()
			.filter(|a| a.order_id == order.id)
			.cloned()
			.collect();
		applications.sort_by_key(|a| a.applied_at_millis);
		let assignments = self
			.assignments
			.iter()
			.filter(|a| a.order_id == order.id)
			.cloned()
			.collect();
		OrderView {
			order: order.clone(),
			applications,
			assignments,
		}
	}

	/// Full joined snapshot, oldest order first.
	fn snapshot(&self) -> Vec<OrderView> {
		let mut views: Vec<OrderView> = self.orders.values().map(|o| self.view_of(o)).collect();
		views.sort_by(|a, b| {
			(a.order.created_at_millis, &a.order.id).cmp(&(b.order.created_at_millis, &b.order.id))
		});
		views
	}

	fn order(&self, order_id: &str) -> Result<&Order, RepositoryError> {
		self.orders.get(order_id).ok_or(RepositoryError::NotFound)
	}

	fn order_mut(&mut self, order_id: &str) -> Result<&mut Order, RepositoryError> {
		self.orders
			.get_mut(order_id)
			.ok_or(RepositoryError::NotFound)
	}

	fn application_mut(
		&mut self,
		order_id: &str,
		loader_id: &str,
	) -> Result<&mut OrderApplication, RepositoryError> {
		self.applications
			.iter_mut()
			.find(|a| a.order_id == order_id && a.loader_id == loader_id)
			.ok_or(RepositoryError::NotFound)
	}

	/// The order id of the worker's active assignment, if any.
	fn active_order_of(&self, loader_id: &str) -> Option<&str> {
		self.assignments
			.iter()
			.find(|a| a.loader_id == loader_id && a.status == AssignmentStatus::Active)
			.map(|a| a.order_id.as_str())
	}

	fn require_status(order: &Order, expected: OrderStatus) -> Result<(), RepositoryError> {
		if order.status != expected {
			return Err(RepositoryError::InvalidState(format!(
				"order {} is {}, expected {}",
				order.id, order.status, expected
			)));
		}
		Ok(())
	}
}

/// In-memory repository implementation.
///
/// The reference backend; also reused by the file backend for its
/// in-process state.
pub struct MemoryRepository {
	store: RwLock<Store>,
	feed: broadcast::Sender<OrdersSnapshot>,
}

impl MemoryRepository {
	/// Creates an empty repository.
	pub fn new() -> Self {
		Self::with_state(RepositoryState::default())
	}

	/// Creates a repository seeded with previously exported state.
	pub fn with_state(state: RepositoryState) -> Self {
		let (feed, _) = broadcast::channel(FEED_CAPACITY);
		let store = Store {
			orders: state.orders.into_iter().map(|o| (o.id.clone(), o)).collect(),
			applications: state.applications,
			assignments: state.assignments,
		};
		Self {
			store: RwLock::new(store),
			feed,
		}
	}

	/// Exports the full store for persistence.
	pub async fn export_state(&self) -> RepositoryState {
		let store = self.store.read().await;
		let mut orders: Vec<Order> = store.orders.values().cloned().collect();
		orders.sort_by(|a, b| a.id.cmp(&b.id));
		RepositoryState {
			orders,
			applications: store.applications.clone(),
			assignments: store.assignments.clone(),
		}
	}

	/// Publishes a fresh snapshot while the caller still holds the lock.
	fn publish(&self, store: &Store) {
		self.feed.send(Arc::new(store.snapshot())).ok();
	}
}

impl Default for MemoryRepository {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderRepository for MemoryRepository {
	async fn get_order(&self, order_id: &str) -> Result<OrderView, RepositoryError> {
		let store = self.store.read().await;
		let order = store.order(order_id)?;
		Ok(store.view_of(order))
	}

	async fn list_orders(&self) -> Result<Vec<OrderView>, RepositoryError> {
		let store = self.store.read().await;
		Ok(store.snapshot())
	}

	fn observe_orders(&self) -> broadcast::Receiver<OrdersSnapshot> {
		self.feed.subscribe()
	}

	async fn create_order(
		&self,
		draft: OrderDraft,
		created_by: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = Order {
			id: Uuid::new_v4().to_string(),
			title: draft.title,
			address: draft.address,
			price_per_hour: draft.price_per_hour,
			schedule: draft.schedule,
			duration_minutes: draft.duration_minutes,
			required_workers: draft.required_workers,
			workers_current: draft.workers_current,
			tags: draft.tags,
			metadata: draft.metadata,
			comment: draft.comment,
			cancel_reason: None,
			status: OrderStatus::Staffing,
			created_by: created_by.to_string(),
			created_at_millis: now_millis,
			updated_at_millis: now_millis,
		};
		let view = store.view_of(&order);
		store.orders.insert(order.id.clone(), order);
		self.publish(&store);
		Ok(view)
	}

	async fn apply_to_order(
		&self,
		order_id: &str,
		loader_id: &str,
		rating: Option<f64>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		Store::require_status(order, OrderStatus::Staffing)?;
		if store
			.applications
			.iter()
			.any(|a| a.order_id == order_id && a.loader_id == loader_id)
		{
			return Err(RepositoryError::DuplicateApplication {
				order_id: order_id.to_string(),
				loader_id: loader_id.to_string(),
			});
		}
		store.applications.push(OrderApplication {
			order_id: order_id.to_string(),
			loader_id: loader_id.to_string(),
			status: ApplicationStatus::Applied,
			applied_at_millis: now_millis,
			rating,
		});
		store.order_mut(order_id)?.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn withdraw_application(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let app = store.application_mut(order_id, loader_id)?;
		if !app.status.is_in_flight() {
			return Err(RepositoryError::InvalidState(format!(
				"application is {}",
				app.status
			)));
		}
		app.status = ApplicationStatus::Withdrawn;
		store.order_mut(order_id)?.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn select_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		Store::require_status(order, OrderStatus::Staffing)?;
		let required = order.required_workers;
		let selected = store
			.applications
			.iter()
			.filter(|a| a.order_id == order_id && a.status == ApplicationStatus::Selected)
			.count() as u32;
		if selected >= required {
			return Err(RepositoryError::InvalidState(format!(
				"all {required} slots already selected"
			)));
		}
		// Fail-fast half of the exclusivity strategy: refuse a worker who
		// is already committed elsewhere.
		if let Some(active) = store.active_order_of(loader_id) {
			if active != order_id {
				return Err(RepositoryError::Exclusivity {
					loader_id: loader_id.to_string(),
					order_id: active.to_string(),
				});
			}
		}
		let app = store.application_mut(order_id, loader_id)?;
		if app.status != ApplicationStatus::Applied {
			return Err(RepositoryError::InvalidState(format!(
				"application is {}",
				app.status
			)));
		}
		app.status = ApplicationStatus::Selected;
		store.order_mut(order_id)?.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn unselect_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		Store::require_status(order, OrderStatus::Staffing)?;
		let app = store.application_mut(order_id, loader_id)?;
		if app.status != ApplicationStatus::Selected {
			return Err(RepositoryError::InvalidState(format!(
				"application is {}",
				app.status
			)));
		}
		app.status = ApplicationStatus::Applied;
		store.order_mut(order_id)?.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn start_order(
		&self,
		order_id: &str,
		started_at_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		Store::require_status(order, OrderStatus::Staffing)?;
		let required = order.required_workers;
		let selected: Vec<OrderApplication> = store
			.applications
			.iter()
			.filter(|a| a.order_id == order_id && a.status == ApplicationStatus::Selected)
			.cloned()
			.collect();
		if selected.len() as u32 != required {
			return Err(RepositoryError::InvalidState(format!(
				"{} of {} workers selected",
				selected.len(),
				required
			)));
		}
		// Authoritative exclusivity check, inside the same critical
		// section as the commit: the use-case level re-check cannot cover
		// the window between its read and this write.
		for app in &selected {
			if let Some(active) = store.active_order_of(&app.loader_id) {
				if active != order_id {
					return Err(RepositoryError::Exclusivity {
						loader_id: app.loader_id.clone(),
						order_id: active.to_string(),
					});
				}
			}
		}
		for app in &selected {
			store.assignments.push(OrderAssignment {
				order_id: order_id.to_string(),
				loader_id: app.loader_id.clone(),
				status: AssignmentStatus::Active,
				assigned_at_millis: app.applied_at_millis,
				started_at_millis: Some(started_at_millis),
			});
		}
		for app in store
			.applications
			.iter_mut()
			.filter(|a| a.order_id == order_id && a.status == ApplicationStatus::Applied)
		{
			app.status = ApplicationStatus::Rejected;
		}
		let order = store.order_mut(order_id)?;
		order.status = OrderStatus::InProgress;
		order.updated_at_millis = started_at_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn cancel_order(
		&self,
		order_id: &str,
		reason: Option<String>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		if order.status.is_terminal() {
			return Err(RepositoryError::InvalidState(format!(
				"order {} is {}",
				order.id, order.status
			)));
		}
		for assignment in store
			.assignments
			.iter_mut()
			.filter(|a| a.order_id == order_id && a.status == AssignmentStatus::Active)
		{
			assignment.status = AssignmentStatus::Canceled;
		}
		let order = store.order_mut(order_id)?;
		order.status = OrderStatus::Canceled;
		order.cancel_reason = reason;
		order.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn complete_order(
		&self,
		order_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let mut store = self.store.write().await;
		let order = store.order(order_id)?;
		Store::require_status(order, OrderStatus::InProgress)?;
		for assignment in store
			.assignments
			.iter_mut()
			.filter(|a| a.order_id == order_id && a.status == AssignmentStatus::Active)
		{
			assignment.status = AssignmentStatus::Completed;
		}
		let order = store.order_mut(order_id)?;
		order.status = OrderStatus::Completed;
		order.updated_at_millis = now_millis;
		let view = store.view_of(store.order(order_id)?);
		self.publish(&store);
		Ok(view)
	}

	async fn refresh(&self, now_millis: u64) -> Result<usize, RepositoryError> {
		let mut store = self.store.write().await;
		let mut expired = 0;
		for order in store.orders.values_mut() {
			if order.status != OrderStatus::Staffing {
				continue;
			}
			// "Soon" orders have no exact start time and never expire.
			match order.schedule.starts_at_millis() {
				Some(starts_at) if starts_at <= now_millis => {
					order.status = OrderStatus::Expired;
					order.updated_at_millis = now_millis;
					expired += 1;
				}
				_ => {}
			}
		}
		if expired > 0 {
			self.publish(&store);
		}
		Ok(expired)
	}

	async fn has_active_assignment(&self, loader_id: &str) -> Result<bool, RepositoryError> {
		let store = self.store.read().await;
		Ok(store.active_order_of(loader_id).is_some())
	}

	async fn get_busy_assignments(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, String>, RepositoryError> {
		let store = self.store.read().await;
		let mut busy = HashMap::new();
		for loader_id in loader_ids {
			if let Some(order_id) = store.active_order_of(loader_id) {
				busy.insert(loader_id.clone(), order_id.to_string());
			}
		}
		Ok(busy)
	}

	async fn count_active_applications_for_limit(
		&self,
		loader_id: &str,
	) -> Result<u32, RepositoryError> {
		let store = self.store.read().await;
		let count = store
			.applications
			.iter()
			.filter(|a| a.loader_id == loader_id && a.status.is_in_flight())
			.filter(|a| {
				store
					.orders
					.get(&a.order_id)
					.is_some_and(|o| !o.status.is_terminal())
			})
			.count() as u32;
		Ok(count)
	}
}

/// Factory function to create an in-memory repository from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_repository(
	_config: &toml::Value,
) -> Result<Arc<dyn OrderRepository>, RepositoryError> {
	Ok(Arc::new(MemoryRepository::new()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crew_types::Schedule;
	use rust_decimal::Decimal;

	const NOW: u64 = 1_700_000_000_000;

	fn draft(required: u32, schedule: Schedule) -> OrderDraft {
		OrderDraft {
			title: "Unload truck".into(),
			address: "Dock 4".into(),
			price_per_hour: Decimal::new(2500, 2),
			schedule,
			duration_minutes: 120,
			required_workers: required,
			workers_current: 0,
			tags: vec![],
			metadata: HashMap::new(),
			comment: None,
		}
	}

	async fn staffed_order(repo: &MemoryRepository, worker: &str) -> String {
		let view = repo
			.create_order(draft(1, Schedule::Soon), "disp-1", NOW)
			.await
			.unwrap();
		let order_id = view.order.id;
		repo.apply_to_order(&order_id, worker, None, NOW + 1)
			.await
			.unwrap();
		repo.select_applicant(&order_id, worker, NOW + 2)
			.await
			.unwrap();
		order_id
	}

	#[tokio::test]
	async fn start_creates_assignments_and_rejects_leftovers() {
		let repo = MemoryRepository::new();
		let order_id = staffed_order(&repo, "w1").await;
		repo.apply_to_order(&order_id, "w2", Some(4.2), NOW + 3)
			.await
			.unwrap();

		let view = repo.start_order(&order_id, NOW + 10).await.unwrap();
		assert_eq!(view.order.status, OrderStatus::InProgress);
		assert_eq!(view.assignments.len(), 1);
		assert_eq!(view.assignments[0].loader_id, "w1");
		assert_eq!(view.assignments[0].status, AssignmentStatus::Active);
		assert_eq!(view.assignments[0].assigned_at_millis, NOW + 1);
		assert_eq!(view.assignments[0].started_at_millis, Some(NOW + 10));
		assert_eq!(
			view.application_of("w2").map(|a| a.status),
			Some(ApplicationStatus::Rejected)
		);
		assert!(view
			.applications
			.iter()
			.all(|a| a.status != ApplicationStatus::Applied));
	}

	#[tokio::test]
	async fn start_refuses_worker_active_elsewhere() {
		let repo = MemoryRepository::new();
		let order_a = staffed_order(&repo, "w1").await;
		let order_b = staffed_order(&repo, "w1").await;

		repo.start_order(&order_b, NOW + 10).await.unwrap();
		let err = repo.start_order(&order_a, NOW + 11).await.unwrap_err();
		match err {
			RepositoryError::Exclusivity {
				loader_id,
				order_id,
			} => {
				assert_eq!(loader_id, "w1");
				assert_eq!(order_id, order_b);
			}
			other => panic!("expected exclusivity error, got {other:?}"),
		}

		// The losing order is untouched.
		let view = repo.get_order(&order_a).await.unwrap();
		assert_eq!(view.order.status, OrderStatus::Staffing);
		assert!(view.assignments.is_empty());
	}

	#[tokio::test]
	async fn select_refuses_busy_worker() {
		let repo = MemoryRepository::new();
		let order_a = staffed_order(&repo, "w1").await;
		repo.start_order(&order_a, NOW + 10).await.unwrap();

		let view = repo
			.create_order(draft(1, Schedule::Soon), "disp-1", NOW + 20)
			.await
			.unwrap();
		repo.apply_to_order(&view.order.id, "w1", None, NOW + 21)
			.await
			.unwrap();
		let err = repo
			.select_applicant(&view.order.id, "w1", NOW + 22)
			.await
			.unwrap_err();
		assert!(matches!(err, RepositoryError::Exclusivity { .. }));
	}

	#[tokio::test]
	async fn exclusivity_invariant_holds_after_interleaved_starts() {
		let repo = MemoryRepository::new();
		let order_a = staffed_order(&repo, "w1").await;
		let order_b = staffed_order(&repo, "w1").await;

		let (first, second) = tokio::join!(
			repo.start_order(&order_a, NOW + 10),
			repo.start_order(&order_b, NOW + 10),
		);
		// Exactly one start wins, whichever acquired the lock first.
		assert!(first.is_ok() ^ second.is_ok());

		let active: usize = repo
			.list_orders()
			.await
			.unwrap()
			.iter()
			.flat_map(|v| v.assignments.iter())
			.filter(|a| a.loader_id == "w1" && a.status == AssignmentStatus::Active)
			.count();
		assert_eq!(active, 1);
	}

	#[tokio::test]
	async fn duplicate_application_is_refused() {
		let repo = MemoryRepository::new();
		let view = repo
			.create_order(draft(1, Schedule::Soon), "disp-1", NOW)
			.await
			.unwrap();
		let order_id = view.order.id;
		repo.apply_to_order(&order_id, "w1", None, NOW + 1)
			.await
			.unwrap();
		repo.withdraw_application(&order_id, "w1", NOW + 2)
			.await
			.unwrap();
		let err = repo
			.apply_to_order(&order_id, "w1", None, NOW + 3)
			.await
			.unwrap_err();
		assert!(matches!(err, RepositoryError::DuplicateApplication { .. }));
	}

	#[tokio::test]
	async fn cancel_cascades_active_assignments() {
		let repo = MemoryRepository::new();
		let order_id = staffed_order(&repo, "w1").await;
		repo.start_order(&order_id, NOW + 10).await.unwrap();

		let view = repo
			.cancel_order(&order_id, Some("truck broke down".into()), NOW + 20)
			.await
			.unwrap();
		assert_eq!(view.order.status, OrderStatus::Canceled);
		assert_eq!(view.order.cancel_reason.as_deref(), Some("truck broke down"));
		assert_eq!(view.assignments[0].status, AssignmentStatus::Canceled);
		assert!(!repo.has_active_assignment("w1").await.unwrap());
	}

	#[tokio::test]
	async fn refresh_expires_only_past_exact_schedules() {
		let repo = MemoryRepository::new();
		let past = repo
			.create_order(
				draft(
					1,
					Schedule::Exact {
						starts_at_millis: NOW - 1,
					},
				),
				"disp-1",
				NOW - 100,
			)
			.await
			.unwrap();
		let future = repo
			.create_order(
				draft(
					1,
					Schedule::Exact {
						starts_at_millis: NOW + 1_000_000,
					},
				),
				"disp-1",
				NOW - 100,
			)
			.await
			.unwrap();
		let soon = repo
			.create_order(draft(1, Schedule::Soon), "disp-1", NOW - 100)
			.await
			.unwrap();

		assert_eq!(repo.refresh(NOW).await.unwrap(), 1);
		assert_eq!(
			repo.get_order(&past.order.id).await.unwrap().order.status,
			OrderStatus::Expired
		);
		assert_eq!(
			repo.get_order(&future.order.id).await.unwrap().order.status,
			OrderStatus::Staffing
		);
		assert_eq!(
			repo.get_order(&soon.order.id).await.unwrap().order.status,
			OrderStatus::Staffing
		);
		// Nothing left to expire; the sweep still succeeds.
		assert_eq!(repo.refresh(NOW).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn busy_map_lists_only_active_workers() {
		let repo = MemoryRepository::new();
		let order_id = staffed_order(&repo, "w1").await;
		repo.start_order(&order_id, NOW + 10).await.unwrap();

		let busy = repo
			.get_busy_assignments(&["w1".into(), "w2".into()])
			.await
			.unwrap();
		assert_eq!(busy.len(), 1);
		assert_eq!(busy.get("w1"), Some(&order_id));

		repo.complete_order(&order_id, NOW + 20).await.unwrap();
		let busy = repo
			.get_busy_assignments(&["w1".into()])
			.await
			.unwrap();
		assert!(busy.is_empty());
	}

	#[tokio::test]
	async fn in_flight_count_ignores_terminal_orders() {
		let repo = MemoryRepository::new();
		let order_a = staffed_order(&repo, "w1").await;
		let view_b = repo
			.create_order(draft(1, Schedule::Soon), "disp-1", NOW)
			.await
			.unwrap();
		repo.apply_to_order(&view_b.order.id, "w1", None, NOW + 1)
			.await
			.unwrap();
		assert_eq!(
			repo.count_active_applications_for_limit("w1").await.unwrap(),
			2
		);

		repo.cancel_order(&order_a, None, NOW + 5).await.unwrap();
		assert_eq!(
			repo.count_active_applications_for_limit("w1").await.unwrap(),
			1
		);
	}

	#[tokio::test]
	async fn observers_receive_consistent_snapshots() {
		let repo = MemoryRepository::new();
		let mut feed = repo.observe_orders();
		let order_id = staffed_order(&repo, "w1").await;
		repo.start_order(&order_id, NOW + 10).await.unwrap();

		let mut last = None;
		while let Ok(snapshot) = feed.try_recv() {
			last = Some(snapshot);
		}
		let snapshot = last.expect("at least one emission");
		assert_eq!(snapshot.len(), 1);
		let view = &snapshot[0];
		// The final emission carries the started order fully joined.
		assert_eq!(view.order.status, OrderStatus::InProgress);
		assert_eq!(view.assignments.len(), 1);
	}
}
