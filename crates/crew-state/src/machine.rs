//! Guard evaluation and transition planning.
//!
//! `actions_for` produces the per-order action matrix for one actor;
//! `transition` validates a single event against the guard table and returns
//! the logical deltas of an approved transition. Persisting those deltas is
//! the repository's job: the machine is the authority on *whether*, the
//! repository on *how*.

use crate::{ActionSet, BlockReason, Capability};
use crew_types::{
	Actor, ApplicationStatus, AssignmentStatus, OrderApplication, OrderAssignment, OrderStatus,
	OrderView, Role,
};
use std::collections::HashMap;

/// A staffing event applied to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
	/// A worker applies to the order.
	Apply,
	/// A worker withdraws their application.
	Withdraw,
	/// The creator selects an applicant.
	Select { loader_id: String },
	/// The creator returns a selected applicant to the pool.
	Unselect { loader_id: String },
	/// The creator starts the fully staffed order.
	Start,
	/// The creator cancels the order.
	Cancel,
	/// The creator or an assigned worker completes the order.
	Complete,
	/// The system expires a staffing order whose start time has passed.
	Expire,
}

/// Facts the machine cannot derive from the order snapshot alone.
///
/// Built by the caller from repository queries; the machine itself stays
/// free of storage access.
#[derive(Debug, Clone)]
pub struct GuardContext {
	/// Order id of the actor's active assignment, if one exists anywhere.
	pub actor_busy_on: Option<String>,
	/// The actor's applied + selected applications across all
	/// non-terminal orders.
	pub applications_in_flight: u32,
	/// Maximum number of in-flight applications per worker.
	pub application_limit: u32,
	/// Active assignments elsewhere for the workers relevant to the
	/// event (the select target, or the selected set for start), as
	/// loader id to conflicting order id.
	pub busy_elsewhere: HashMap<String, String>,
}

impl GuardContext {
	/// An empty context with the given application limit.
	pub fn with_limit(application_limit: u32) -> Self {
		Self {
			actor_busy_on: None,
			applications_in_flight: 0,
			application_limit,
			busy_elsewhere: HashMap::new(),
		}
	}
}

/// The logical outcome of an approved transition.
///
/// Carries the new order status plus the same-transaction application and
/// assignment deltas; the whole plan commits as one unit or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
	/// Status the order moves to (possibly unchanged).
	pub order_status: OrderStatus,
	/// A new application to insert, for APPLY.
	pub insert_application: Option<OrderApplication>,
	/// Status updates to existing applications, keyed by loader id.
	pub application_updates: Vec<(String, ApplicationStatus)>,
	/// New assignments to insert, for START.
	pub insert_assignments: Vec<OrderAssignment>,
	/// Status updates to existing assignments, keyed by loader id.
	pub assignment_updates: Vec<(String, AssignmentStatus)>,
}

impl TransitionPlan {
	fn status_only(order_status: OrderStatus) -> Self {
		Self {
			order_status,
			insert_application: None,
			application_updates: Vec::new(),
			insert_assignments: Vec::new(),
			assignment_updates: Vec::new(),
		}
	}
}

/// Computes the full action matrix for one order and one actor.
pub fn actions_for(view: &OrderView, actor: &Actor, ctx: &GuardContext) -> ActionSet {
	ActionSet {
		apply: guard_apply(view, actor, ctx).into(),
		withdraw: guard_withdraw(view, actor).into(),
		select: guard_select(view, actor, ctx, None).into(),
		unselect: guard_unselect(view, actor, None).into(),
		start: guard_start(view, actor, ctx).into(),
		cancel: guard_cancel(view, actor).into(),
		complete: guard_complete(view, actor).into(),
		open_chat: guard_open_chat(view, actor).into(),
	}
}

/// Validates an event and returns the logical deltas of the transition.
pub fn transition(
	view: &OrderView,
	event: &OrderEvent,
	actor: &Actor,
	now_millis: u64,
	ctx: &GuardContext,
) -> Result<TransitionPlan, BlockReason> {
	match event {
		OrderEvent::Apply => {
			guard_apply(view, actor, ctx)?;
			Ok(TransitionPlan {
				insert_application: Some(OrderApplication {
					order_id: view.order.id.clone(),
					loader_id: actor.id.clone(),
					status: ApplicationStatus::Applied,
					applied_at_millis: now_millis,
					rating: None,
				}),
				..TransitionPlan::status_only(view.order.status)
			})
		}
		OrderEvent::Withdraw => {
			guard_withdraw(view, actor)?;
			Ok(TransitionPlan {
				application_updates: vec![(actor.id.clone(), ApplicationStatus::Withdrawn)],
				..TransitionPlan::status_only(view.order.status)
			})
		}
		OrderEvent::Select { loader_id } => {
			guard_select(view, actor, ctx, Some(loader_id))?;
			Ok(TransitionPlan {
				application_updates: vec![(loader_id.clone(), ApplicationStatus::Selected)],
				..TransitionPlan::status_only(view.order.status)
			})
		}
		OrderEvent::Unselect { loader_id } => {
			guard_unselect(view, actor, Some(loader_id))?;
			Ok(TransitionPlan {
				application_updates: vec![(loader_id.clone(), ApplicationStatus::Applied)],
				..TransitionPlan::status_only(view.order.status)
			})
		}
		OrderEvent::Start => {
			guard_start(view, actor, ctx)?;
			let insert_assignments = view
				.applications
				.iter()
				.filter(|a| a.status == ApplicationStatus::Selected)
				.map(|a| OrderAssignment {
					order_id: view.order.id.clone(),
					loader_id: a.loader_id.clone(),
					status: AssignmentStatus::Active,
					assigned_at_millis: a.applied_at_millis,
					started_at_millis: Some(now_millis),
				})
				.collect();
			let application_updates = view
				.applications
				.iter()
				.filter(|a| a.status == ApplicationStatus::Applied)
				.map(|a| (a.loader_id.clone(), ApplicationStatus::Rejected))
				.collect();
			Ok(TransitionPlan {
				order_status: OrderStatus::InProgress,
				insert_application: None,
				application_updates,
				insert_assignments,
				assignment_updates: Vec::new(),
			})
		}
		OrderEvent::Cancel => {
			guard_cancel(view, actor)?;
			Ok(TransitionPlan {
				order_status: OrderStatus::Canceled,
				assignment_updates: cascade(view, AssignmentStatus::Canceled),
				..TransitionPlan::status_only(OrderStatus::Canceled)
			})
		}
		OrderEvent::Complete => {
			guard_complete(view, actor)?;
			Ok(TransitionPlan {
				order_status: OrderStatus::Completed,
				assignment_updates: cascade(view, AssignmentStatus::Completed),
				..TransitionPlan::status_only(OrderStatus::Completed)
			})
		}
		OrderEvent::Expire => {
			guard_expire(view, now_millis)?;
			Ok(TransitionPlan::status_only(OrderStatus::Expired))
		}
	}
}

/// Flips every active assignment on the order to the given status.
fn cascade(view: &OrderView, to: AssignmentStatus) -> Vec<(String, AssignmentStatus)> {
	view.active_assignments()
		.map(|a| (a.loader_id.clone(), to))
		.collect()
}

/// Status precondition shared by every staffing-phase guard.
fn require_staffing(view: &OrderView) -> Result<(), BlockReason> {
	let status = view.order.status;
	if status.is_terminal() {
		return Err(BlockReason::TerminalStatus { status });
	}
	if status != OrderStatus::Staffing {
		return Err(BlockReason::UnsupportedEvent { status });
	}
	Ok(())
}

fn require_creator(view: &OrderView, actor: &Actor) -> Result<(), BlockReason> {
	if actor.role != Role::Dispatcher {
		return Err(BlockReason::WrongRole {
			required: Role::Dispatcher,
		});
	}
	if actor.id != view.order.created_by {
		return Err(BlockReason::NotCreator);
	}
	Ok(())
}

fn guard_apply(view: &OrderView, actor: &Actor, ctx: &GuardContext) -> Result<(), BlockReason> {
	if actor.role != Role::Worker {
		return Err(BlockReason::WrongRole {
			required: Role::Worker,
		});
	}
	require_staffing(view)?;
	// Re-applying after a withdrawn or rejected application is not
	// supported: one application row per (order, worker), ever.
	if view.application_of(&actor.id).is_some() {
		return Err(BlockReason::AlreadyApplied);
	}
	if let Some(order_id) = &ctx.actor_busy_on {
		return Err(BlockReason::WorkerBusy {
			loader_id: actor.id.clone(),
			order_id: order_id.clone(),
		});
	}
	if ctx.applications_in_flight >= ctx.application_limit {
		return Err(BlockReason::ApplicationLimitReached {
			limit: ctx.application_limit,
		});
	}
	Ok(())
}

fn guard_withdraw(view: &OrderView, actor: &Actor) -> Result<(), BlockReason> {
	if actor.role != Role::Worker {
		return Err(BlockReason::WrongRole {
			required: Role::Worker,
		});
	}
	require_staffing(view)?;
	match view.application_of(&actor.id) {
		Some(app) if app.status.is_in_flight() => Ok(()),
		_ => Err(BlockReason::NoApplication),
	}
}

/// Select guard. With `target` None this answers "could the actor select
/// some applicant now", which is what the action matrix reports.
fn guard_select(
	view: &OrderView,
	actor: &Actor,
	ctx: &GuardContext,
	target: Option<&str>,
) -> Result<(), BlockReason> {
	require_creator(view, actor)?;
	require_staffing(view)?;
	let required = view.order.required_workers;
	if view.selected_count() >= required {
		return Err(BlockReason::SelectionFull { required });
	}
	if let Some(loader_id) = target {
		let app = view
			.application_of(loader_id)
			.ok_or(BlockReason::NoApplication)?;
		if app.status != ApplicationStatus::Applied {
			return Err(BlockReason::ApplicationNotApplied { status: app.status });
		}
		if let Some(order_id) = busy_on_other_order(view, ctx, loader_id) {
			return Err(BlockReason::WorkerBusy {
				loader_id: loader_id.to_string(),
				order_id,
			});
		}
	}
	Ok(())
}

fn guard_unselect(view: &OrderView, actor: &Actor, target: Option<&str>) -> Result<(), BlockReason> {
	require_creator(view, actor)?;
	require_staffing(view)?;
	match target {
		Some(loader_id) => {
			let app = view
				.application_of(loader_id)
				.ok_or(BlockReason::NoApplication)?;
			if app.status != ApplicationStatus::Selected {
				return Err(BlockReason::ApplicationNotSelected { status: app.status });
			}
			Ok(())
		}
		None if view.selected_count() == 0 => Err(BlockReason::NothingSelected),
		None => Ok(()),
	}
}

fn guard_start(view: &OrderView, actor: &Actor, ctx: &GuardContext) -> Result<(), BlockReason> {
	require_creator(view, actor)?;
	require_staffing(view)?;
	let selected = view.selected_count();
	let required = view.order.required_workers;
	if selected != required {
		return Err(BlockReason::SelectedCountMismatch { selected, required });
	}
	// Quorum alone is not enough: none of the selected workers may have
	// gone active on another order since they were selected.
	for loader_id in view.selected_loader_ids() {
		if let Some(order_id) = busy_on_other_order(view, ctx, &loader_id) {
			return Err(BlockReason::WorkerBusy {
				loader_id,
				order_id,
			});
		}
	}
	Ok(())
}

fn guard_cancel(view: &OrderView, actor: &Actor) -> Result<(), BlockReason> {
	require_creator(view, actor)?;
	let status = view.order.status;
	if status.is_terminal() {
		return Err(BlockReason::TerminalStatus { status });
	}
	Ok(())
}

fn guard_complete(view: &OrderView, actor: &Actor) -> Result<(), BlockReason> {
	let status = view.order.status;
	if status.is_terminal() {
		return Err(BlockReason::TerminalStatus { status });
	}
	if status != OrderStatus::InProgress {
		return Err(BlockReason::UnsupportedEvent { status });
	}
	match actor.role {
		Role::Dispatcher if actor.id == view.order.created_by => Ok(()),
		Role::Dispatcher => Err(BlockReason::NotCreator),
		Role::Worker if view.has_active_assignment(&actor.id) => Ok(()),
		Role::Worker => Err(BlockReason::NotParticipant),
	}
}

fn guard_open_chat(view: &OrderView, actor: &Actor) -> Result<(), BlockReason> {
	if view.order.status == OrderStatus::Expired {
		return Err(BlockReason::TerminalStatus {
			status: OrderStatus::Expired,
		});
	}
	let participates = actor.id == view.order.created_by
		|| view
			.application_of(&actor.id)
			.is_some_and(|a| a.status != ApplicationStatus::Withdrawn)
		|| view.assignments.iter().any(|a| a.loader_id == actor.id);
	if participates {
		Ok(())
	} else {
		Err(BlockReason::NotParticipant)
	}
}

fn guard_expire(view: &OrderView, now_millis: u64) -> Result<(), BlockReason> {
	let status = view.order.status;
	if status.is_terminal() {
		return Err(BlockReason::TerminalStatus { status });
	}
	if status != OrderStatus::Staffing {
		return Err(BlockReason::UnsupportedEvent { status });
	}
	match view.order.schedule.starts_at_millis() {
		Some(starts_at) if starts_at <= now_millis => Ok(()),
		// "Soon" orders never auto-expire.
		_ => Err(BlockReason::ExpiryNotDue),
	}
}

/// The conflicting order id if the worker is active somewhere other than
/// the order under consideration.
fn busy_on_other_order(view: &OrderView, ctx: &GuardContext, loader_id: &str) -> Option<String> {
	ctx.busy_elsewhere
		.get(loader_id)
		.filter(|order_id| **order_id != view.order.id)
		.cloned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crew_types::{Order, Schedule};
	use rust_decimal::Decimal;
	use std::collections::HashMap;

	const NOW: u64 = 1_700_000_000_000;

	fn order(status: OrderStatus, required: u32) -> OrderView {
		OrderView {
			order: Order {
				id: "order-a".into(),
				title: "Unload pallets".into(),
				address: "Warehouse 9".into(),
				price_per_hour: Decimal::new(3000, 2),
				schedule: Schedule::Soon,
				duration_minutes: 180,
				required_workers: required,
				workers_current: 0,
				tags: vec![],
				metadata: HashMap::new(),
				comment: None,
				cancel_reason: None,
				status,
				created_by: "disp-1".into(),
				created_at_millis: NOW,
				updated_at_millis: NOW,
			},
			applications: vec![],
			assignments: vec![],
		}
	}

	fn with_application(mut view: OrderView, loader: &str, status: ApplicationStatus) -> OrderView {
		view.applications.push(OrderApplication {
			order_id: view.order.id.clone(),
			loader_id: loader.into(),
			status,
			applied_at_millis: NOW - 1000,
			rating: None,
		});
		view
	}

	fn ctx() -> GuardContext {
		GuardContext::with_limit(3)
	}

	fn creator() -> Actor {
		Actor::dispatcher("disp-1")
	}

	#[test]
	fn worker_can_apply_while_staffing() {
		let view = order(OrderStatus::Staffing, 1);
		let actions = actions_for(&view, &Actor::worker("w1"), &ctx());
		assert!(actions.apply.allowed);
		assert_eq!(
			actions.withdraw.reason,
			Some(BlockReason::NoApplication)
		);
	}

	#[test]
	fn dispatcher_cannot_apply() {
		let view = order(OrderStatus::Staffing, 1);
		let plan = transition(&view, &OrderEvent::Apply, &creator(), NOW, &ctx());
		assert_eq!(
			plan.unwrap_err(),
			BlockReason::WrongRole {
				required: Role::Worker
			}
		);
	}

	#[test]
	fn apply_twice_is_blocked_in_any_status() {
		for status in [
			ApplicationStatus::Applied,
			ApplicationStatus::Selected,
			ApplicationStatus::Rejected,
			ApplicationStatus::Withdrawn,
		] {
			let view = with_application(order(OrderStatus::Staffing, 1), "w1", status);
			let got = transition(&view, &OrderEvent::Apply, &Actor::worker("w1"), NOW, &ctx());
			assert_eq!(got.unwrap_err(), BlockReason::AlreadyApplied);
		}
	}

	#[test]
	fn busy_worker_cannot_apply() {
		let view = order(OrderStatus::Staffing, 1);
		let mut context = ctx();
		context.actor_busy_on = Some("order-b".into());
		let got = transition(&view, &OrderEvent::Apply, &Actor::worker("w1"), NOW, &context);
		assert_eq!(
			got.unwrap_err(),
			BlockReason::WorkerBusy {
				loader_id: "w1".into(),
				order_id: "order-b".into()
			}
		);
	}

	#[test]
	fn in_flight_limit_blocks_fourth_application() {
		let view = order(OrderStatus::Staffing, 1);
		let mut context = ctx();
		context.applications_in_flight = 3;
		let actions = actions_for(&view, &Actor::worker("w1"), &context);
		assert!(!actions.apply.allowed);
		assert_eq!(
			actions.apply.reason,
			Some(BlockReason::ApplicationLimitReached { limit: 3 })
		);
	}

	#[test]
	fn select_requires_creator() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Applied);
		let other = Actor::dispatcher("disp-2");
		let got = transition(
			&view,
			&OrderEvent::Select {
				loader_id: "w1".into(),
			},
			&other,
			NOW,
			&ctx(),
		);
		assert_eq!(got.unwrap_err(), BlockReason::NotCreator);
	}

	#[test]
	fn select_blocked_when_target_busy_elsewhere() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Applied);
		let mut context = ctx();
		context
			.busy_elsewhere
			.insert("w1".into(), "order-b".into());
		let got = transition(
			&view,
			&OrderEvent::Select {
				loader_id: "w1".into(),
			},
			&creator(),
			NOW,
			&context,
		);
		assert_eq!(
			got.unwrap_err(),
			BlockReason::WorkerBusy {
				loader_id: "w1".into(),
				order_id: "order-b".into()
			}
		);
	}

	#[test]
	fn select_beyond_required_is_blocked() {
		let view = with_application(
			with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Selected),
			"w2",
			ApplicationStatus::Applied,
		);
		let got = transition(
			&view,
			&OrderEvent::Select {
				loader_id: "w2".into(),
			},
			&creator(),
			NOW,
			&ctx(),
		);
		assert_eq!(got.unwrap_err(), BlockReason::SelectionFull { required: 1 });
	}

	#[test]
	fn start_needs_full_quorum_and_reports_progress() {
		let view = with_application(order(OrderStatus::Staffing, 2), "w1", ApplicationStatus::Selected);
		let actions = actions_for(&view, &creator(), &ctx());
		assert!(!actions.start.allowed);
		let reason = actions.start.reason.clone().unwrap();
		assert_eq!(
			reason,
			BlockReason::SelectedCountMismatch {
				selected: 1,
				required: 2
			}
		);
		assert!(reason.to_string().contains("1 of 2"));
	}

	#[test]
	fn start_plan_assigns_selected_and_rejects_leftovers() {
		let view = with_application(
			with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Selected),
			"w2",
			ApplicationStatus::Applied,
		);
		let plan = transition(&view, &OrderEvent::Start, &creator(), NOW, &ctx()).unwrap();
		assert_eq!(plan.order_status, OrderStatus::InProgress);
		assert_eq!(plan.insert_assignments.len(), 1);
		let assignment = &plan.insert_assignments[0];
		assert_eq!(assignment.loader_id, "w1");
		assert_eq!(assignment.status, AssignmentStatus::Active);
		assert_eq!(assignment.assigned_at_millis, NOW - 1000);
		assert_eq!(assignment.started_at_millis, Some(NOW));
		assert_eq!(
			plan.application_updates,
			vec![("w2".to_string(), ApplicationStatus::Rejected)]
		);
	}

	#[test]
	fn start_recheck_catches_selected_worker_gone_busy() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Selected);
		let mut context = ctx();
		context
			.busy_elsewhere
			.insert("w1".into(), "order-b".into());
		let got = transition(&view, &OrderEvent::Start, &creator(), NOW, &context);
		assert_eq!(
			got.unwrap_err(),
			BlockReason::WorkerBusy {
				loader_id: "w1".into(),
				order_id: "order-b".into()
			}
		);
	}

	#[test]
	fn busy_on_this_order_is_not_a_conflict() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Selected);
		let mut context = ctx();
		context
			.busy_elsewhere
			.insert("w1".into(), view.order.id.clone());
		assert!(transition(&view, &OrderEvent::Start, &creator(), NOW, &context).is_ok());
	}

	#[test]
	fn terminal_statuses_reject_every_event() {
		let events = [
			OrderEvent::Apply,
			OrderEvent::Withdraw,
			OrderEvent::Select {
				loader_id: "w1".into(),
			},
			OrderEvent::Unselect {
				loader_id: "w1".into(),
			},
			OrderEvent::Start,
			OrderEvent::Cancel,
			OrderEvent::Complete,
			OrderEvent::Expire,
		];
		for status in [
			OrderStatus::Completed,
			OrderStatus::Canceled,
			OrderStatus::Expired,
		] {
			for event in &events {
				let view = order(status, 1);
				// Pick an actor that passes the role gate so the status
				// check is what trips.
				let actor = match event {
					OrderEvent::Apply | OrderEvent::Withdraw => Actor::worker("w1"),
					_ => creator(),
				};
				let got = transition(&view, event, &actor, NOW, &ctx());
				assert_eq!(
					got.unwrap_err(),
					BlockReason::TerminalStatus { status },
					"{event:?} on {status}"
				);
			}
		}
	}

	#[test]
	fn cancel_covers_staffing_and_in_progress() {
		for status in [OrderStatus::Staffing, OrderStatus::InProgress] {
			let view = order(status, 1);
			let plan = transition(&view, &OrderEvent::Cancel, &creator(), NOW, &ctx()).unwrap();
			assert_eq!(plan.order_status, OrderStatus::Canceled);
		}
	}

	#[test]
	fn cancel_cascades_active_assignments() {
		let mut view = order(OrderStatus::InProgress, 1);
		view.assignments.push(OrderAssignment {
			order_id: view.order.id.clone(),
			loader_id: "w1".into(),
			status: AssignmentStatus::Active,
			assigned_at_millis: NOW - 1000,
			started_at_millis: Some(NOW - 500),
		});
		let plan = transition(&view, &OrderEvent::Cancel, &creator(), NOW, &ctx()).unwrap();
		assert_eq!(
			plan.assignment_updates,
			vec![("w1".to_string(), AssignmentStatus::Canceled)]
		);
	}

	#[test]
	fn assigned_worker_may_complete() {
		let mut view = order(OrderStatus::InProgress, 1);
		view.assignments.push(OrderAssignment {
			order_id: view.order.id.clone(),
			loader_id: "w1".into(),
			status: AssignmentStatus::Active,
			assigned_at_millis: NOW - 1000,
			started_at_millis: Some(NOW - 500),
		});
		let plan = transition(&view, &OrderEvent::Complete, &Actor::worker("w1"), NOW, &ctx());
		assert_eq!(plan.unwrap().order_status, OrderStatus::Completed);

		let stranger = transition(&view, &OrderEvent::Complete, &Actor::worker("w2"), NOW, &ctx());
		assert_eq!(stranger.unwrap_err(), BlockReason::NotParticipant);
	}

	#[test]
	fn expire_only_past_exact_schedules() {
		let mut view = order(OrderStatus::Staffing, 1);
		view.order.schedule = Schedule::Exact {
			starts_at_millis: NOW - 1,
		};
		assert!(transition(&view, &OrderEvent::Expire, &creator(), NOW, &ctx()).is_ok());

		view.order.schedule = Schedule::Exact {
			starts_at_millis: NOW + 1,
		};
		assert_eq!(
			transition(&view, &OrderEvent::Expire, &creator(), NOW, &ctx()).unwrap_err(),
			BlockReason::ExpiryNotDue
		);

		view.order.schedule = Schedule::Soon;
		assert_eq!(
			transition(&view, &OrderEvent::Expire, &creator(), NOW, &ctx()).unwrap_err(),
			BlockReason::ExpiryNotDue
		);
	}

	#[test]
	fn withdraw_covers_applied_and_selected() {
		for status in [ApplicationStatus::Applied, ApplicationStatus::Selected] {
			let view = with_application(order(OrderStatus::Staffing, 1), "w1", status);
			let plan =
				transition(&view, &OrderEvent::Withdraw, &Actor::worker("w1"), NOW, &ctx()).unwrap();
			assert_eq!(
				plan.application_updates,
				vec![("w1".to_string(), ApplicationStatus::Withdrawn)]
			);
		}
	}

	#[test]
	fn unselect_returns_application_to_pool() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Selected);
		let plan = transition(
			&view,
			&OrderEvent::Unselect {
				loader_id: "w1".into(),
			},
			&creator(),
			NOW,
			&ctx(),
		)
		.unwrap();
		assert_eq!(
			plan.application_updates,
			vec![("w1".to_string(), ApplicationStatus::Applied)]
		);
	}

	#[test]
	fn chat_is_for_participants_only() {
		let view = with_application(order(OrderStatus::Staffing, 1), "w1", ApplicationStatus::Applied);
		assert!(actions_for(&view, &creator(), &ctx()).open_chat.allowed);
		assert!(actions_for(&view, &Actor::worker("w1"), &ctx()).open_chat.allowed);
		assert_eq!(
			actions_for(&view, &Actor::worker("w2"), &ctx()).open_chat.reason,
			Some(BlockReason::NotParticipant)
		);
	}
}
