// self
use crate::{_prelude::*, environment::EnvironmentId, oauth::GrantType};

/// Future returned by [`FlowSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`].
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span attached to one broker operation; zero-sized without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `stage` (the operation name) of `grant` in `environment`.
	pub fn new(grant: GrantType, stage: &'static str, environment: &EnvironmentId) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_env_broker.flow",
				flow = grant.as_str(),
				stage,
				environment = %environment
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage, environment);

			Self {}
		}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Attaches the span to `fut`; it is entered on every poll and never held across awaits.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn sandbox() -> EnvironmentId {
		EnvironmentId::new("api.sandbox.ebay.com").expect("Identifier is valid.")
	}

	#[test]
	fn in_scope_returns_the_closure_value() {
		let span = FlowSpan::new(GrantType::AuthorizationCode, "authorization_url", &sandbox());

		assert_eq!(span.in_scope(|| "url"), "url");
	}

	#[tokio::test]
	async fn instrument_passes_values_through() {
		let span = FlowSpan::new(GrantType::RefreshToken, "token_from_refresh_token", &sandbox());

		assert_eq!(span.instrument(async { 7 }).await, 7);
	}
}
