//! Staffing engine that orchestrates the order lifecycle.
//!
//! The engine is the single entry point the presentation layer calls: a
//! closed command set dispatched to the matching use case, every
//! invocation logged on entry and on success or failure. No retries;
//! retrying is a presentation concern.

use crate::usecases::{
	ApplyToOrderUseCase, CancelOrderUseCase, CompleteOrderUseCase, CreateOrderUseCase,
	GetRespondersWithAvailabilityUseCase, ObserveOrderUiModelsUseCase, RefreshOrdersUseCase,
	SelectApplicantUseCase, SelectOutcome, StartOrderUseCase, StartOutcome,
	UnselectApplicantUseCase, WithdrawApplicationUseCase,
};
use crate::{AvailabilityResolver, Clock, SessionProvider, StaffingError};
use crew_storage::OrderRepository;
use crew_types::{Command, CommandOutcome};
use std::sync::Arc;

/// Main staffing engine dispatching commands to use cases.
pub struct StaffingEngine {
	repository: Arc<dyn OrderRepository>,
	create: CreateOrderUseCase,
	apply: ApplyToOrderUseCase,
	withdraw: WithdrawApplicationUseCase,
	select: SelectApplicantUseCase,
	unselect: UnselectApplicantUseCase,
	start: StartOrderUseCase,
	cancel: CancelOrderUseCase,
	complete: CompleteOrderUseCase,
	refresh: RefreshOrdersUseCase,
	ui_models: ObserveOrderUiModelsUseCase,
	responders: GetRespondersWithAvailabilityUseCase,
}

impl StaffingEngine {
	/// Wires the engine with the given repository, session, and clock.
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		session: Arc<dyn SessionProvider>,
		clock: Arc<dyn Clock>,
		application_limit: u32,
	) -> Self {
		let availability = Arc::new(AvailabilityResolver::new(repository.clone()));

		Self {
			create: CreateOrderUseCase::new(repository.clone(), session.clone(), clock.clone()),
			apply: ApplyToOrderUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				availability.clone(),
				application_limit,
			),
			withdraw: WithdrawApplicationUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				application_limit,
			),
			select: SelectApplicantUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				availability.clone(),
				application_limit,
			),
			unselect: UnselectApplicantUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				application_limit,
			),
			start: StartOrderUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				availability.clone(),
				application_limit,
			),
			cancel: CancelOrderUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				application_limit,
			),
			complete: CompleteOrderUseCase::new(
				repository.clone(),
				session.clone(),
				clock.clone(),
				application_limit,
			),
			refresh: RefreshOrdersUseCase::new(repository.clone(), clock.clone()),
			ui_models: ObserveOrderUiModelsUseCase::new(
				repository.clone(),
				session.clone(),
				availability.clone(),
				application_limit,
			),
			responders: GetRespondersWithAvailabilityUseCase::new(availability),
			repository,
		}
	}

	/// Dispatches one command to its use case.
	pub async fn dispatch(&self, command: Command) -> Result<CommandOutcome, StaffingError> {
		let name = command.name();
		tracing::info!(command = name, "Dispatching");

		let result = self.run(command).await;
		match &result {
			Ok(_) => tracing::info!(command = name, "Succeeded"),
			Err(e) => tracing::warn!(command = name, reason = %e, "Failed"),
		}
		result
	}

	async fn run(&self, command: Command) -> Result<CommandOutcome, StaffingError> {
		match command {
			Command::Refresh => {
				let expired = self.refresh.execute().await?;
				Ok(CommandOutcome::Refreshed { expired })
			}
			Command::Create { draft } => {
				Ok(CommandOutcome::Order(self.create.execute(draft).await?))
			}
			Command::Apply { order_id, rating } => Ok(CommandOutcome::Order(
				self.apply.execute(&order_id, rating).await?,
			)),
			Command::Withdraw { order_id } => Ok(CommandOutcome::Order(
				self.withdraw.execute(&order_id).await?,
			)),
			Command::Select {
				order_id,
				loader_id,
			} => match self.select.execute(&order_id, &loader_id).await? {
				SelectOutcome::Selected(view) => Ok(CommandOutcome::Order(view)),
				SelectOutcome::AlreadyAssigned {
					loader_id,
					order_id,
				} => Ok(CommandOutcome::WorkerBusy {
					loader_id,
					order_id,
				}),
			},
			Command::Unselect {
				order_id,
				loader_id,
			} => Ok(CommandOutcome::Order(
				self.unselect.execute(&order_id, &loader_id).await?,
			)),
			Command::Start { order_id } => match self.start.execute(&order_id).await? {
				StartOutcome::Started(view) => Ok(CommandOutcome::Order(view)),
				StartOutcome::AssigneeAlreadyBusy {
					loader_id,
					conflicting_order_id,
				} => Ok(CommandOutcome::WorkerBusy {
					loader_id,
					order_id: conflicting_order_id,
				}),
			},
			Command::Cancel { order_id, reason } => Ok(CommandOutcome::Order(
				self.cancel.execute(&order_id, reason).await?,
			)),
			Command::Complete { order_id } => Ok(CommandOutcome::Order(
				self.complete.execute(&order_id).await?,
			)),
		}
	}

	/// The view-model query surface for the presentation layer.
	pub fn ui_models(&self) -> &ObserveOrderUiModelsUseCase {
		&self.ui_models
	}

	/// The batch availability query surface.
	pub fn responders(&self) -> &GetRespondersWithAvailabilityUseCase {
		&self.responders
	}

	/// Returns a reference to the repository.
	pub fn repository(&self) -> &Arc<dyn OrderRepository> {
		&self.repository
	}
}
