//! Storage module for the crew staffing system.
//!
//! This module defines the repository abstraction the staffing engine
//! depends on: order CRUD, the staffing mutations, the exclusivity and
//! limit queries, and a push-based snapshot feed. Backends must linearize
//! mutations touching one order's applications and assignments with
//! respect to each other, and every mutation must commit as one unit;
//! an observer never sees a partially applied staffing change.

use async_trait::async_trait;
use crew_types::{Order, OrderApplication, OrderAssignment, OrderDraft, OrderView, OrdersSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
	/// The requested order or application does not exist.
	#[error("Not found")]
	NotFound,
	/// The (order, worker) pair already has an application.
	#[error("Worker {loader_id} already applied to order {order_id}")]
	DuplicateApplication { order_id: String, loader_id: String },
	/// The mutation does not fit the record's current status.
	#[error("Invalid state: {0}")]
	InvalidState(String),
	/// Committing would give the worker a second active assignment.
	#[error("Worker {loader_id} is already active on order {order_id}")]
	Exclusivity { loader_id: String, order_id: String },
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the repository contract for staffing data.
///
/// Contract guarantees backends must uphold:
/// - mutations touching one order's applications/assignments are
///   linearizable with respect to each other (no lost updates);
/// - multi-entity mutations (start, cancel, complete) are atomic;
/// - `start_order` and `select_applicant` refuse to commit a state where
///   a worker would hold two active assignments;
/// - every successful mutation publishes a fresh fully-joined snapshot.
#[async_trait]
pub trait OrderRepository: Send + Sync {
	/// Retrieves one order with its applications and assignments joined.
	async fn get_order(&self, order_id: &str) -> Result<OrderView, RepositoryError>;

	/// Lists all orders as a consistent joined snapshot.
	async fn list_orders(&self) -> Result<Vec<OrderView>, RepositoryError>;

	/// Subscribes to the live snapshot feed.
	///
	/// The feed re-delivers the full joined order list on every relevant
	/// mutation. A lagging subscriber may miss intermediate snapshots but
	/// never observes a torn one.
	fn observe_orders(&self) -> broadcast::Receiver<OrdersSnapshot>;

	/// Creates a new staffing order from a validated draft.
	async fn create_order(
		&self,
		draft: OrderDraft,
		created_by: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Records a worker's application on a staffing order.
	async fn apply_to_order(
		&self,
		order_id: &str,
		loader_id: &str,
		rating: Option<f64>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Withdraws a worker's in-flight application.
	async fn withdraw_application(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Moves an applied application to selected.
	async fn select_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Returns a selected application to the applicant pool.
	async fn unselect_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Starts a fully staffed order.
	///
	/// Atomically creates one active assignment per selected application
	/// (assignment time taken from the application, start time from
	/// `started_at_millis`), rejects leftover applied applications, and
	/// moves the order to in-progress.
	async fn start_order(
		&self,
		order_id: &str,
		started_at_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Cancels an order, cascading active assignments to canceled.
	async fn cancel_order(
		&self,
		order_id: &str,
		reason: Option<String>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Completes an in-progress order, cascading active assignments to
	/// completed.
	async fn complete_order(
		&self,
		order_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError>;

	/// Sweeps staffing orders whose exact start time has passed into
	/// expired. Returns how many orders were swept; sweeping nothing is
	/// not an error.
	async fn refresh(&self, now_millis: u64) -> Result<usize, RepositoryError>;

	/// Returns true if the worker holds an active assignment anywhere.
	async fn has_active_assignment(&self, loader_id: &str) -> Result<bool, RepositoryError>;

	/// Resolves active assignments for a set of workers in one call.
	///
	/// Only workers with an active assignment appear in the result, as
	/// loader id to active order id.
	async fn get_busy_assignments(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, String>, RepositoryError>;

	/// Counts the worker's applied + selected applications across all
	/// non-terminal orders.
	async fn count_active_applications_for_limit(
		&self,
		loader_id: &str,
	) -> Result<u32, RepositoryError>;
}

/// Serializable dump of a repository's full state.
///
/// Used by the file backend to persist and reload the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryState {
	pub orders: Vec<Order>,
	pub applications: Vec<OrderApplication>,
	pub assignments: Vec<OrderAssignment>,
}

/// Type alias for repository factory functions.
///
/// This is the function signature that all repository implementations must
/// provide to create instances from configuration.
pub type RepositoryFactory =
	fn(&toml::Value) -> Result<Arc<dyn OrderRepository>, RepositoryError>;

/// Get all registered repository implementations.
///
/// Returns a vector of (name, factory) tuples for all available backends.
pub fn get_all_implementations() -> Vec<(&'static str, RepositoryFactory)> {
	use implementations::{file, memory};

	vec![
		("memory", memory::create_repository as RepositoryFactory),
		("file", file::create_repository as RepositoryFactory),
	]
}
