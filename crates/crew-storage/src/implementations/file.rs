//! File-backed repository for the staffing system.
//!
//! Keeps the full store in memory (delegating every operation to the
//! in-memory backend) and persists a JSON dump after each successful
//! mutation, writing to a temp file and renaming so a crash never leaves
//! a half-written store behind. State is reloaded on startup.

use crate::implementations::memory::MemoryRepository;
use crate::{OrderRepository, RepositoryError, RepositoryState};
use async_trait::async_trait;
use crew_types::{OrderDraft, OrderView, OrdersSnapshot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::broadcast;

/// File-backed repository implementation.
pub struct FileRepository {
	inner: MemoryRepository,
	path: PathBuf,
}

impl FileRepository {
	/// Opens a repository at the given path, loading existing state.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
		let path = path.into();
		let state = match std::fs::read(&path) {
			Ok(bytes) => serde_json::from_slice(&bytes)
				.map_err(|e| RepositoryError::Serialization(e.to_string()))?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => RepositoryState::default(),
			Err(e) => return Err(RepositoryError::Backend(e.to_string())),
		};
		tracing::debug!(
			orders = state.orders.len(),
			path = %path.display(),
			"Loaded staffing store"
		);
		Ok(Self {
			inner: MemoryRepository::with_state(state),
			path,
		})
	}

	/// Persists the current state atomically.
	async fn persist(&self) -> Result<(), RepositoryError> {
		let state = self.inner.export_state().await;
		let bytes = serde_json::to_vec_pretty(&state)
			.map_err(|e| RepositoryError::Serialization(e.to_string()))?;

		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)
					.await
					.map_err(|e| RepositoryError::Backend(e.to_string()))?;
			}
		}

		// Write atomically by writing to temp file then renaming.
		let temp_path = self.path.with_extension("tmp");
		fs::write(&temp_path, bytes)
			.await
			.map_err(|e| RepositoryError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &self.path)
			.await
			.map_err(|e| RepositoryError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn committed(&self, view: OrderView) -> Result<OrderView, RepositoryError> {
		self.persist().await?;
		Ok(view)
	}
}

#[async_trait]
impl OrderRepository for FileRepository {
	async fn get_order(&self, order_id: &str) -> Result<OrderView, RepositoryError> {
		self.inner.get_order(order_id).await
	}

	async fn list_orders(&self) -> Result<Vec<OrderView>, RepositoryError> {
		self.inner.list_orders().await
	}

	fn observe_orders(&self) -> broadcast::Receiver<OrdersSnapshot> {
		self.inner.observe_orders()
	}

	async fn create_order(
		&self,
		draft: OrderDraft,
		created_by: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self.inner.create_order(draft, created_by, now_millis).await?;
		self.committed(view).await
	}

	async fn apply_to_order(
		&self,
		order_id: &str,
		loader_id: &str,
		rating: Option<f64>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self
			.inner
			.apply_to_order(order_id, loader_id, rating, now_millis)
			.await?;
		self.committed(view).await
	}

	async fn withdraw_application(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self
			.inner
			.withdraw_application(order_id, loader_id, now_millis)
			.await?;
		self.committed(view).await
	}

	async fn select_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self
			.inner
			.select_applicant(order_id, loader_id, now_millis)
			.await?;
		self.committed(view).await
	}

	async fn unselect_applicant(
		&self,
		order_id: &str,
		loader_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self
			.inner
			.unselect_applicant(order_id, loader_id, now_millis)
			.await?;
		self.committed(view).await
	}

	async fn start_order(
		&self,
		order_id: &str,
		started_at_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self.inner.start_order(order_id, started_at_millis).await?;
		self.committed(view).await
	}

	async fn cancel_order(
		&self,
		order_id: &str,
		reason: Option<String>,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self.inner.cancel_order(order_id, reason, now_millis).await?;
		self.committed(view).await
	}

	async fn complete_order(
		&self,
		order_id: &str,
		now_millis: u64,
	) -> Result<OrderView, RepositoryError> {
		let view = self.inner.complete_order(order_id, now_millis).await?;
		self.committed(view).await
	}

	async fn refresh(&self, now_millis: u64) -> Result<usize, RepositoryError> {
		let expired = self.inner.refresh(now_millis).await?;
		if expired > 0 {
			self.persist().await?;
		}
		Ok(expired)
	}

	async fn has_active_assignment(&self, loader_id: &str) -> Result<bool, RepositoryError> {
		self.inner.has_active_assignment(loader_id).await
	}

	async fn get_busy_assignments(
		&self,
		loader_ids: &[String],
	) -> Result<HashMap<String, String>, RepositoryError> {
		self.inner.get_busy_assignments(loader_ids).await
	}

	async fn count_active_applications_for_limit(
		&self,
		loader_id: &str,
	) -> Result<u32, RepositoryError> {
		self.inner.count_active_applications_for_limit(loader_id).await
	}
}

/// Factory function to create a file repository from configuration.
///
/// Configuration parameters:
/// - `path`: Location of the JSON store (default: "./data/orders.json")
pub fn create_repository(
	config: &toml::Value,
) -> Result<Arc<dyn OrderRepository>, RepositoryError> {
	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/orders.json");
	Ok(Arc::new(FileRepository::open(Path::new(path))?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crew_types::{OrderStatus, Schedule};
	use rust_decimal::Decimal;

	const NOW: u64 = 1_700_000_000_000;

	fn draft() -> OrderDraft {
		OrderDraft {
			title: "Move crates".into(),
			address: "Pier 7".into(),
			price_per_hour: Decimal::new(1800, 2),
			schedule: Schedule::Soon,
			duration_minutes: 60,
			required_workers: 1,
			workers_current: 0,
			tags: vec![],
			metadata: HashMap::new(),
			comment: None,
		}
	}

	#[tokio::test]
	async fn state_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("orders.json");

		let order_id = {
			let repo = FileRepository::open(&path).unwrap();
			let view = repo.create_order(draft(), "disp-1", NOW).await.unwrap();
			let order_id = view.order.id;
			repo.apply_to_order(&order_id, "w1", None, NOW + 1)
				.await
				.unwrap();
			repo.select_applicant(&order_id, "w1", NOW + 2)
				.await
				.unwrap();
			repo.start_order(&order_id, NOW + 3).await.unwrap();
			order_id
		};

		let reopened = FileRepository::open(&path).unwrap();
		let view = reopened.get_order(&order_id).await.unwrap();
		assert_eq!(view.order.status, OrderStatus::InProgress);
		assert_eq!(view.assignments.len(), 1);
		assert!(reopened.has_active_assignment("w1").await.unwrap());
	}

	#[tokio::test]
	async fn missing_file_starts_empty() {
		let dir = tempfile::tempdir().unwrap();
		let repo = FileRepository::open(dir.path().join("fresh.json")).unwrap();
		assert!(repo.list_orders().await.unwrap().is_empty());
	}
}
