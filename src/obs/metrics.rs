// self
use crate::{
	environment::EnvironmentId,
	oauth::GrantType,
	obs::{CacheLookup, FlowOutcome},
};

/// Counts one attempt, success or failure of a broker operation.
pub fn record_flow_outcome(grant: GrantType, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_env_broker_flow_total",
			"flow" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = (grant, outcome);
}

/// Records an application token source lookup.
///
/// Hits are also reported as a `debug` event when tracing is enabled; misses are implied by the
/// exchange that follows.
pub fn record_cache_lookup(environment: &EnvironmentId, lookup: CacheLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_env_broker_cache_total", "outcome" => lookup.as_str())
			.increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		if lookup == CacheLookup::Hit {
			tracing::debug!(%environment, "application token source served from cache");
		}
	}

	#[cfg(not(feature = "tracing"))]
	let _ = environment;
	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	let _ = lookup;
}
