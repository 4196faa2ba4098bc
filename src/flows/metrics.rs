// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token endpoint exchanges performed by a broker's sources.
///
/// Only real exchanges are counted; tokens served from a source without contacting the
/// endpoint are not.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	started: AtomicU64,
	succeeded: AtomicU64,
	failed: AtomicU64,
}
impl ExchangeMetrics {
	/// Exchanges sent to a token endpoint.
	pub fn attempts(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Exchanges that produced a token.
	pub fn successes(&self) -> u64 {
		self.succeeded.load(Ordering::Relaxed)
	}

	/// Exchanges that ended in an error.
	pub fn failures(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record<T, E>(&self, result: &Result<T, E>) {
		let counter = if result.is_ok() { &self.succeeded } else { &self.failed };

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
