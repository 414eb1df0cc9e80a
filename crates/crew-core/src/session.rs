//! Session boundary of the staffing engine.
//!
//! The engine never manages authentication itself; it asks the surrounding
//! session who is acting. An absent actor is a normal condition the use
//! cases must answer with a typed failure, never a crash.

use async_trait::async_trait;
use crew_types::Actor;
use tokio::sync::RwLock;

/// Trait defining the interface for actor/session providers.
#[async_trait]
pub trait SessionProvider: Send + Sync {
	/// The actor the surrounding session is acting as, if any.
	async fn current_actor(&self) -> Option<Actor>;
}

/// Session provider holding an explicitly set actor.
///
/// Used by the service binary (which runs system-only commands with no
/// actor) and by tests that switch actors between steps.
pub struct StaticSession {
	actor: RwLock<Option<Actor>>,
}

impl StaticSession {
	/// Creates a session acting as the given actor.
	pub fn new(actor: Option<Actor>) -> Self {
		Self {
			actor: RwLock::new(actor),
		}
	}

	/// Creates a session with no actor selected.
	pub fn anonymous() -> Self {
		Self::new(None)
	}

	/// Switches the session to a different actor.
	pub async fn set(&self, actor: Option<Actor>) {
		*self.actor.write().await = actor;
	}
}

#[async_trait]
impl SessionProvider for StaticSession {
	async fn current_actor(&self) -> Option<Actor> {
		self.actor.read().await.clone()
	}
}
