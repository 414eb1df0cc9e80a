//! Joined order snapshot types.
//!
//! The repository owns orders, applications, and assignments separately and
//! joins them by order id into an [`OrderView`] before handing them to the
//! engine. Guards and view-model aggregation work exclusively on these
//! snapshots so that deriving a per-order action matrix needs no further
//! repository calls.

use crate::{ApplicationStatus, AssignmentStatus, OrderApplication, OrderAssignment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A fully joined, consistent snapshot of the whole order list.
///
/// Published by the repository on every relevant mutation. Observers either
/// see a complete emission or none, never a partially updated one.
pub type OrdersSnapshot = Arc<Vec<OrderView>>;

/// An order together with its applications and assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
	/// The order record.
	pub order: crate::Order,
	/// Applications on this order, ordered by application time.
	pub applications: Vec<OrderApplication>,
	/// Assignments on this order.
	pub assignments: Vec<OrderAssignment>,
}

impl OrderView {
	/// Number of applications currently selected.
	pub fn selected_count(&self) -> u32 {
		self.applications
			.iter()
			.filter(|a| a.status == ApplicationStatus::Selected)
			.count() as u32
	}

	/// Loader ids of the currently selected applications.
	pub fn selected_loader_ids(&self) -> Vec<String> {
		self.applications
			.iter()
			.filter(|a| a.status == ApplicationStatus::Selected)
			.map(|a| a.loader_id.clone())
			.collect()
	}

	/// The given worker's application on this order, if any.
	pub fn application_of(&self, loader_id: &str) -> Option<&OrderApplication> {
		self.applications.iter().find(|a| a.loader_id == loader_id)
	}

	/// The given worker's active assignment on this order, if any.
	pub fn active_assignment_of(&self, loader_id: &str) -> Option<&OrderAssignment> {
		self.assignments
			.iter()
			.find(|a| a.loader_id == loader_id && a.status == AssignmentStatus::Active)
	}

	/// Returns true if the given worker holds an active assignment here.
	pub fn has_active_assignment(&self, loader_id: &str) -> bool {
		self.active_assignment_of(loader_id).is_some()
	}

	/// All active assignments on this order.
	pub fn active_assignments(&self) -> impl Iterator<Item = &OrderAssignment> {
		self.assignments
			.iter()
			.filter(|a| a.status == AssignmentStatus::Active)
	}
}
