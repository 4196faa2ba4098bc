//! Optional observability helpers for broker operations.
//!
//! Both backends are opt-in:
//!
//! - Enable `tracing` to emit spans named `oauth2_env_broker.flow` carrying the `flow` (grant),
//!   `stage` (operation) and `environment` fields, plus a `debug` event for cache hits.
//! - Enable `metrics` to increment `oauth2_env_broker_flow_total` for every
//!   attempt/success/failure (labeled by `flow` + `outcome`) and
//!   `oauth2_env_broker_cache_total` for every application source lookup (labeled by `outcome`).
//!
//! Labels come from [`GrantType`](crate::oauth::GrantType) and the operation name.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// The operation returned `Ok`.
	Success,
	/// The operation returned an error.
	Failure,
}
impl FlowOutcome {
	/// Label used for the `outcome` metric dimension.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Outcome matching a finished operation.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of looking up an environment's application token source in the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLookup {
	/// An existing source was reused.
	Hit,
	/// A new source was constructed and stored.
	Miss,
}
impl CacheLookup {
	/// Label used for the cache `outcome` dimension.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheLookup::Hit => "hit",
			CacheLookup::Miss => "miss",
		}
	}
}
impl Display for CacheLookup {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
