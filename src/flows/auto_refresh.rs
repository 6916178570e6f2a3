//! Background loop that keeps the broker's token alive.
//!
//! The loop issues a first token, sleeps until `margin` before expiry, refreshes, and
//! repeats. Failed calls are retried with bounded exponential backoff instead of ending the
//! loop; after enough consecutive refresh failures it falls back to a fresh issue. The loop
//! only stops on its own when the platform hands out a token without a refresh token, and
//! does so as soon as that token is installed.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::task::JoinHandle;
// self
use crate::{
	_prelude::*,
	auth::ActiveToken,
	flows::{BackoffPolicy, Broker},
	http::PlatformHttpClient,
};

/// Default number of consecutive refresh failures before re-issuing from scratch.
pub const DEFAULT_REISSUE_AFTER_FAILURES: u32 = 3;

/// Observable state of the refresh loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
	/// No token yet; the next step is an initial issue.
	NeedInitial,
	/// Initial issue in flight.
	Issuing,
	/// Token installed; sleeping until the next refresh.
	Active,
	/// Refresh in flight.
	Refreshing,
	/// Last call failed; sleeping before retry.
	Backoff {
		/// Consecutive failures so far.
		failures: u32,
	},
	/// Loop ended.
	Stopped(LoopExit),
}

/// Reason the loop ended on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
	/// The current token carries an access token but no refresh token.
	NoRefreshToken,
}

/// Next step chosen for the current store contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopAction {
	/// Obtain a first token.
	Issue,
	/// Rotate the current token.
	Refresh,
	/// End the loop.
	Stop(LoopExit),
}

/// Chooses the next loop step.
///
/// `reissue` forces an initial issue, used after repeated refresh failures.
pub fn plan(current: Option<&ActiveToken>, reissue: bool) -> LoopAction {
	match current {
		_ if reissue => LoopAction::Issue,
		None => LoopAction::Issue,
		Some(active) if !active.token.has_access_token() => LoopAction::Issue,
		Some(active) if active.token.refresh_token().is_some() => LoopAction::Refresh,
		Some(_) => LoopAction::Stop(LoopExit::NoRefreshToken),
	}
}

/// Configured refresh loop, consumed by [`AutoRefresh::run`] or [`AutoRefresh::spawn`].
pub struct AutoRefresh<C = crate::http::ReqwestHttpClient>
where
	C: ?Sized + PlatformHttpClient,
{
	broker: Broker<C>,
	backoff: BackoffPolicy,
	reissue_after_failures: u32,
	state: Arc<Mutex<LoopState>>,
}
impl<C> AutoRefresh<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Creates a loop over `broker` with default backoff.
	pub fn new(broker: Broker<C>) -> Self {
		Self {
			broker,
			backoff: BackoffPolicy::default(),
			reissue_after_failures: DEFAULT_REISSUE_AFTER_FAILURES,
			state: Arc::new(Mutex::new(LoopState::NeedInitial)),
		}
	}

	/// Overrides the retry backoff.
	pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
		self.backoff = backoff;

		self
	}

	/// Consecutive failures after which the loop re-issues; `0` disables the fallback.
	pub fn with_reissue_after(mut self, failures: u32) -> Self {
		self.reissue_after_failures = failures;

		self
	}

	/// Current loop state.
	pub fn state(&self) -> LoopState {
		*self.state.lock()
	}

	/// Runs the loop on the current task until it stops.
	pub async fn run(self) -> LoopExit {
		let mut failures = 0_u32;

		loop {
			let current = self.broker.store.get().await;
			let reissue = self.reissue_after_failures > 0 && failures >= self.reissue_after_failures;
			let result = match plan(current.as_ref(), reissue) {
				LoopAction::Issue => {
					if reissue && current.is_some() {
						tracing::warn!(failures, "Refresh keeps failing; issuing a fresh token.");
					}

					self.set_state(LoopState::Issuing);
					self.broker.fetch_initial().await
				},
				LoopAction::Refresh => {
					self.set_state(LoopState::Refreshing);
					self.broker.refresh().await
				},
				LoopAction::Stop(exit) => return self.stop(exit),
			};
			let delay = match result {
				Ok(_) => {
					failures = 0;

					if let LoopAction::Stop(exit) = plan(self.broker.store.get().await.as_ref(), false) {
						return self.stop(exit);
					}

					self.set_state(LoopState::Active);
					self.broker.wake_delay(OffsetDateTime::now_utc()).await
				},
				Err(err) => {
					failures = failures.saturating_add(1);

					let delay = self.backoff.delay_for(failures);

					tracing::error!(error = %err, failures, retry_in = ?delay, "Token maintenance failed.");
					self.set_state(LoopState::Backoff { failures });

					delay
				},
			};

			tracing::debug!(sleep = ?delay, "Refresh loop sleeping.");
			tokio::time::sleep(delay).await;
		}
	}

	/// Runs the loop on a tokio task.
	pub fn spawn(self) -> AutoRefreshHandle {
		let state = self.state.clone();
		let task = tokio::spawn(self.run());

		AutoRefreshHandle { state, task }
	}

	fn stop(&self, exit: LoopExit) -> LoopExit {
		tracing::warn!(?exit, "Token has no refresh token; stopping the refresh loop.");
		self.set_state(LoopState::Stopped(exit));

		exit
	}

	fn set_state(&self, state: LoopState) {
		*self.state.lock() = state;
	}
}
impl<C> Debug for AutoRefresh<C>
where
	C: ?Sized + PlatformHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AutoRefresh")
			.field("broker", &self.broker)
			.field("backoff", &self.backoff)
			.field("reissue_after_failures", &self.reissue_after_failures)
			.field("state", &self.state())
			.finish()
	}
}

/// Handle to a spawned refresh loop.
#[derive(Debug)]
pub struct AutoRefreshHandle {
	state: Arc<Mutex<LoopState>>,
	task: JoinHandle<LoopExit>,
}
impl AutoRefreshHandle {
	/// Current loop state.
	pub fn state(&self) -> LoopState {
		*self.state.lock()
	}

	/// Cancels the loop at its next await point.
	pub fn abort(&self) {
		self.task.abort();
	}

	/// Waits for the loop to end; `None` when it was aborted or panicked.
	pub async fn wait(self) -> Option<LoopExit> {
		self.task.await.ok()
	}

	/// Waits at most `timeout` for the state to satisfy `predicate`.
	pub async fn wait_for<F>(&self, timeout: StdDuration, predicate: F) -> Option<LoopState>
	where
		F: Fn(LoopState) -> bool,
	{
		tokio::time::timeout(timeout, async {
			loop {
				let state = self.state();

				if predicate(state) {
					return state;
				}

				tokio::time::sleep(StdDuration::from_millis(10)).await;
			}
		})
		.await
		.ok()
	}
}
