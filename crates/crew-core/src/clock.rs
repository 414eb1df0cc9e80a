//! Clock boundary of the staffing engine.
//!
//! All timestamps flow in through this trait so tests can run against a
//! deterministic clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies "now" for timestamps.
pub trait Clock: Send + Sync {
	/// Current time as Unix milliseconds.
	fn now_millis(&self) -> u64;
}

/// Clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_millis() as u64)
			.unwrap_or_default()
	}
}

/// Deterministic clock for tests.
pub struct FixedClock {
	millis: AtomicU64,
}

impl FixedClock {
	/// Creates a clock frozen at the given instant.
	pub fn at(millis: u64) -> Self {
		Self {
			millis: AtomicU64::new(millis),
		}
	}

	/// Moves the clock forward.
	pub fn advance(&self, millis: u64) {
		self.millis.fetch_add(millis, Ordering::SeqCst);
	}
}

impl Clock for FixedClock {
	fn now_millis(&self) -> u64 {
		self.millis.load(Ordering::SeqCst)
	}
}
