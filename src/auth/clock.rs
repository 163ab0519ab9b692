//! Time sources used to stamp assertions and expire cached tokens.

// self
use crate::_prelude::*;

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same instant, so a test can hand one clone to the signer and the
/// exchanger and advance both at once.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
impl ManualClock {
	/// Creates a clock frozen at `instant`.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(Arc::new(Mutex::new(instant)))
	}

	/// Creates a clock frozen at the current wall-clock instant, truncated to whole seconds.
	pub fn starting_now() -> Self {
		let now = OffsetDateTime::now_utc();

		Self::new(now.replace_nanosecond(0).unwrap_or(now))
	}

	/// Moves the clock forward by `by`.
	pub fn advance(&self, by: Duration) {
		let mut guard = self.0.lock();

		*guard += by;
	}

	/// Sets the clock to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn manual_clock_clones_share_state() {
		let clock = ManualClock::new(datetime!(2025-01-01 00:00 UTC));
		let shared = clock.clone();

		shared.advance(Duration::seconds(3_601));

		assert_eq!(clock.now(), datetime!(2025-01-01 01:00:01 UTC));

		clock.set(datetime!(2030-06-01 12:00 UTC));

		assert_eq!(shared.now(), datetime!(2030-06-01 12:00 UTC));
	}

	#[test]
	fn starting_now_has_no_subsecond_component() {
		assert_eq!(ManualClock::starting_now().now().nanosecond(), 0);
	}
}
