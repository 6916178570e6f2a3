//! Wake-up scheduling for the refresh loop.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, flows::Broker, http::PlatformHttpClient};

/// How long before expiry the loop wakes up to refresh.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::seconds(120);
/// Shortest sleep the loop accepts, so a stale token cannot cause a busy spin.
pub const DEFAULT_MIN_WAKE_DELAY: StdDuration = StdDuration::from_secs(1);

/// Raw time until the next refresh: `expires_at - now - margin`.
///
/// The result is negative once the refresh point has passed.
pub fn next_wake_delay(expires_at: OffsetDateTime, now: OffsetDateTime, margin: Duration) -> Duration {
	expires_at - now - margin
}

/// Refresh margin plus the lower bound applied to every computed sleep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshSchedule {
	/// Lead time before expiry at which the refresh runs.
	pub margin: Duration,
	/// Minimum sleep between loop iterations.
	pub min_wake_delay: StdDuration,
}
impl RefreshSchedule {
	/// Creates a schedule; a negative margin is treated as zero.
	pub fn new(margin: Duration, min_wake_delay: StdDuration) -> Self {
		Self { margin: if margin.is_negative() { Duration::ZERO } else { margin }, min_wake_delay }
	}

	/// Sleep before the next refresh, clamped to [`Self::min_wake_delay`].
	pub fn wake_delay(&self, expires_at: OffsetDateTime, now: OffsetDateTime) -> StdDuration {
		let delay = next_wake_delay(expires_at, now, self.margin);

		StdDuration::try_from(delay).unwrap_or(StdDuration::ZERO).max(self.min_wake_delay)
	}
}
impl Default for RefreshSchedule {
	fn default() -> Self {
		Self { margin: DEFAULT_REFRESH_MARGIN, min_wake_delay: DEFAULT_MIN_WAKE_DELAY }
	}
}

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Raw delay until the current token should be refreshed, or `None` without a token.
	pub async fn next_wake_delay(&self, now: OffsetDateTime) -> Option<Duration> {
		let active = self.store.get().await?;

		Some(next_wake_delay(active.expires_at, now, self.schedule.margin))
	}

	/// Clamped sleep for the refresh loop; falls back to the minimum without a token.
	pub async fn wake_delay(&self, now: OffsetDateTime) -> StdDuration {
		match self.store.get().await {
			Some(active) => self.schedule.wake_delay(active.expires_at, now),
			None => self.schedule.min_wake_delay,
		}
	}
}
