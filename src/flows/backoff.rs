//! Bounded exponential backoff used after failed token calls.

// std
use std::time::Duration as StdDuration;
// crates.io
use rand::Rng;

/// Doubling delay with an upper bound and optional jitter.
///
/// With jitter enabled the delay for an attempt is drawn uniformly from the upper half of
/// the un-jittered value, so concurrent brokers restarting together spread out while the
/// delay still grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
	/// Delay after the first failure.
	pub initial: StdDuration,
	/// Upper bound for any delay.
	pub max: StdDuration,
	/// Randomizes each delay when `true`.
	pub jitter: bool,
}
impl BackoffPolicy {
	/// Creates a policy; `max` is raised to `initial` when smaller.
	pub fn new(initial: StdDuration, max: StdDuration) -> Self {
		Self { initial, max: max.max(initial), jitter: true }
	}

	/// Enables or disables jitter.
	pub fn with_jitter(mut self, jitter: bool) -> Self {
		self.jitter = jitter;

		self
	}

	/// Delay after `failures` consecutive failures (1-based).
	pub fn delay_for(&self, failures: u32) -> StdDuration {
		let exponent = failures.saturating_sub(1).min(31);
		let base = self.initial.saturating_mul(1_u32 << exponent).min(self.max);

		if !self.jitter || base.is_zero() {
			return base;
		}

		let half = base / 2;
		let spread = u64::try_from((base - half).as_millis()).unwrap_or(u64::MAX);

		half + StdDuration::from_millis(rand::rng().random_range(0..=spread))
	}
}
impl Default for BackoffPolicy {
	fn default() -> Self {
		Self::new(StdDuration::from_secs(1), StdDuration::from_secs(300))
	}
}
