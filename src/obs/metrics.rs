// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"iot_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Thread-safe counters for token lifecycle calls, kept on the broker.
#[derive(Debug, Default)]
pub struct LifecycleMetrics {
	issues: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl LifecycleMetrics {
	/// Returns the number of successful initial token issues.
	pub fn issues(&self) -> u64 {
		self.issues.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refreshes.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed issue or refresh calls.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record(&self, kind: FlowKind, outcome: FlowOutcome) {
		record_flow_outcome(kind, outcome);

		let counter = match (kind, outcome) {
			(FlowKind::Issue, FlowOutcome::Success) => &self.issues,
			(FlowKind::Refresh, FlowOutcome::Success) => &self.refreshes,
			(FlowKind::Issue | FlowKind::Refresh, FlowOutcome::Failure) => &self.failures,
			_ => return,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
