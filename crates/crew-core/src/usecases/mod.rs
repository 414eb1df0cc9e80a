//! Business operations of the staffing engine.
//!
//! One use case per operation. Each resolves the acting identity from the
//! session, asks the state machine for permission, and only then asks the
//! repository to mutate, folding every failure into [`StaffingError`]
//! (or a richer outcome enum where the caller needs the conflicting ids).

pub mod apply;
pub mod create;
pub mod lifecycle;
pub mod observe;
pub mod refresh;
pub mod responders;
pub mod select;
pub mod start;

pub use apply::{ApplyToOrderUseCase, WithdrawApplicationUseCase};
pub use create::CreateOrderUseCase;
pub use lifecycle::{CancelOrderUseCase, CompleteOrderUseCase};
pub use observe::{ObserveOrderUiModelsUseCase, OrderUiModel};
pub use refresh::RefreshOrdersUseCase;
pub use responders::GetRespondersWithAvailabilityUseCase;
pub use select::{SelectApplicantUseCase, SelectOutcome, UnselectApplicantUseCase};
pub use start::{StartOrderUseCase, StartOutcome};

use crate::{SessionProvider, StaffingError};
use crew_storage::OrderRepository;
use crew_types::{Actor, OrderView};

/// Resolves the session actor or fails with `NoActor`.
pub(crate) async fn require_actor(
	session: &dyn SessionProvider,
) -> Result<Actor, StaffingError> {
	session.current_actor().await.ok_or(StaffingError::NoActor)
}

/// Fetches a joined order view, mapping a missing order to `NotFound`.
pub(crate) async fn fetch_order(
	repository: &dyn OrderRepository,
	order_id: &str,
) -> Result<OrderView, StaffingError> {
	repository
		.get_order(order_id)
		.await
		.map_err(|e| StaffingError::from_repository(order_id, e))
}
