//! The broker and the grant operations it exposes per environment.
//!
//! A [`Broker`] owns the transport, the environment registry, the credential resolver and the
//! application token cache. Grant-specific operations live in submodules as additional
//! `impl` blocks:
//!
//! - application tokens (client credentials), cached per environment,
//! - authorization-code URLs and code exchanges,
//! - refresh-token exchanges.

pub mod config;

mod application;
mod authorization_code;
mod metrics;
mod refresh;

pub use authorization_code::random_state;
pub use config::*;
pub use metrics::*;

// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	credentials::{CredentialResolver, CredentialSet},
	environment::{Environment, EnvironmentId, EnvironmentRegistry, RegistryError},
	http::TokenTransport,
	oauth::{GrantType, TransportErrorMapper},
	obs::{self, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")]
use crate::{
	client::AuthorizedClient, http::ReqwestTransport, oauth::ReqwestTransportErrorMapper,
	source::TokenSource,
};

/// Broker specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestBroker = Broker<ReqwestTransport, ReqwestTransportErrorMapper>;

/// Issues tokens for any environment in its registry.
///
/// Cloning a broker is cheap and every clone shares the same application token cache, so one
/// broker (or its clones) should be created per process. Operations never mutate
/// configuration; the registry and credentials are fixed at construction.
pub struct Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Transport used for every token endpoint exchange.
	pub transport: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Environments this broker can issue tokens for.
	pub registry: Arc<EnvironmentRegistry>,
	/// Source of per-environment credential sets.
	pub credentials: Arc<dyn CredentialResolver>,
	/// Application token sources keyed by environment identifier.
	pub cache: Arc<TokenCache>,
	/// Counters for token endpoint exchanges shared by every source this broker creates.
	pub exchange_metrics: Arc<ExchangeMetrics>,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_transport(
		registry: Arc<EnvironmentRegistry>,
		credentials: Arc<dyn CredentialResolver>,
		transport: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			transport: transport.into(),
			transport_mapper: mapper.into(),
			registry,
			credentials,
			cache: Default::default(),
			exchange_metrics: Default::default(),
		}
	}

	/// Resolves a raw configuration identifier (case-insensitively) to a registered
	/// environment.
	pub fn environment(&self, identifier: &str) -> Result<&Environment> {
		self.registry
			.lookup(identifier)
			.ok_or_else(|| RegistryError::UnknownEnvironment(identifier.to_owned()).into())
	}

	/// Returns the credential set configured for `environment`.
	pub fn credentials_for(&self, environment: &Environment) -> Result<&CredentialSet> {
		self.credentials
			.resolve(environment)
			.ok_or_else(|| Error::CredentialsNotFound { environment: environment.id.clone() })
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestTransport, ReqwestTransportErrorMapper> {
	/// Creates a broker backed by a default reqwest client.
	///
	/// Use [`Broker::with_transport`] to supply a client with custom timeouts or proxies.
	pub fn new(registry: Arc<EnvironmentRegistry>, credentials: Arc<dyn CredentialResolver>) -> Self {
		Self::with_transport(
			registry,
			credentials,
			ReqwestTransport::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	fn authorized_client(
		&self,
		environment: &Environment,
		source: Arc<dyn TokenSource>,
	) -> AuthorizedClient {
		AuthorizedClient::new(self.transport.client().clone(), source, environment.id.clone())
	}
}
impl<C, M> Clone for Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			transport_mapper: self.transport_mapper.clone(),
			registry: self.registry.clone(),
			credentials: self.credentials.clone(),
			cache: self.cache.clone(),
			exchange_metrics: self.exchange_metrics.clone(),
		}
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("registry", &self.registry)
			.field("cache", &self.cache)
			.field("exchange_metrics", &self.exchange_metrics)
			.finish()
	}
}

/// Runs `fut` inside a flow span and records its attempt and outcome.
async fn observed<T, Fut>(
	grant: GrantType,
	stage: &'static str,
	environment: &EnvironmentId,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(grant, stage, environment);

	obs::record_flow_outcome(grant, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	obs::record_flow_outcome(grant, FlowOutcome::of(&result));

	result
}
