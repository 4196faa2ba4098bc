//! Application (client-credentials) tokens, cached per environment.
//!
//! The first call for an environment resolves its credentials, builds an
//! [`ApplicationTokenSource`] and stores it in the broker's [`TokenCache`](crate::cache::TokenCache);
//! every later call for that environment reuses the stored source and only reaches the token
//! endpoint once the source's token has expired. The cache is keyed by environment alone, so
//! the scopes of the call that created the source apply to all later calls.

// self
use crate::{
	_prelude::*,
	environment::Environment,
	flows::{self, Broker, ClientCredentialsConfig, config},
	http::TokenTransport,
	oauth::{BasicFacade, GrantType, TransportErrorMapper},
	obs,
	source::{
		ApplicationTokenSource, ClientCredentialsFetcher, ReuseTokenSource, TokenSource,
	},
	token::Token,
};
#[cfg(feature = "reqwest")]
use crate::{
	client::AuthorizedClient,
	flows::ReqwestBroker,
	obs::{FlowOutcome, FlowSpan},
};

const GRANT: GrantType = GrantType::ClientCredentials;

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns an application token for `environment`.
	///
	/// Fails with [`Error::CredentialsNotFound`] when the environment has no credentials and
	/// nothing was cached for it yet, and with [`Error::TokenExchange`] when the token endpoint
	/// rejects the exchange.
	pub async fn application_token(
		&self,
		environment: &Environment,
		scopes: &[&str],
	) -> Result<Token> {
		flows::observed(GRANT, "application_token", &environment.id, async move {
			let source = self.application_source(environment, scopes).await?;

			source.token().await.map_err(|e| Error::token_exchange(&environment.id, e))
		})
		.await
	}

	/// Returns the cached application token source for `environment`, creating it on first use.
	pub(crate) async fn application_source(
		&self,
		environment: &Environment,
		scopes: &[&str],
	) -> Result<Arc<dyn TokenSource>> {
		let (source, lookup) = self
			.cache
			.get_or_try_insert_with(&environment.id, || {
				self.new_application_source(environment, scopes)
			})
			.await?;

		obs::record_cache_lookup(&environment.id, lookup);

		Ok(source)
	}

	fn new_application_source(
		&self,
		environment: &Environment,
		scopes: &[&str],
	) -> Result<Arc<dyn TokenSource>> {
		let credentials = self.credentials_for(environment)?;
		let config = config::client_credentials_config(credentials, environment, scopes);

		Ok(Arc::new(ApplicationTokenSource::new(self.client_credentials_source(config))))
	}

	fn client_credentials_source(
		&self,
		config: ClientCredentialsConfig,
	) -> ReuseTokenSource<ClientCredentialsFetcher<C, M>> {
		let facade = BasicFacade::for_client_credentials(
			&config,
			self.transport.clone(),
			self.transport_mapper.clone(),
		);

		ReuseTokenSource::new(ClientCredentialsFetcher::new(
			facade,
			config.scopes,
			self.exchange_metrics.clone(),
		))
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestBroker {
	/// Returns an HTTP client that attaches application tokens for `environment`.
	///
	/// The client owns a fresh self-refreshing source that is independent from the cache, and
	/// no exchange happens until the first request is authorized.
	pub fn application_client(
		&self,
		environment: &Environment,
		scopes: &[&str],
	) -> Result<AuthorizedClient> {
		let span = FlowSpan::new(GRANT, "application_client", &environment.id);

		span.in_scope(|| {
			obs::record_flow_outcome(GRANT, FlowOutcome::Attempt);

			let result = self
				.new_application_source(environment, scopes)
				.map(|source| self.authorized_client(environment, source));

			obs::record_flow_outcome(GRANT, FlowOutcome::of(&result));

			result
		})
	}

	/// Returns an application token together with a client sharing the cached source.
	pub async fn application_token_and_client(
		&self,
		environment: &Environment,
		scopes: &[&str],
	) -> Result<(Token, AuthorizedClient)> {
		flows::observed(GRANT, "application_token_and_client", &environment.id, async move {
			let source = self.application_source(environment, scopes).await?;
			let token =
				source.token().await.map_err(|e| Error::token_exchange(&environment.id, e))?;

			Ok((token, self.authorized_client(environment, source)))
		})
		.await
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{ReqwestTestBroker, build_reqwest_test_broker, mock_environment};

	fn offline_broker() -> (ReqwestTestBroker, Environment, Environment) {
		build_reqwest_test_broker("https://127.0.0.1:9", "https://127.0.0.1:9", "app", "cert")
	}

	#[tokio::test]
	async fn missing_credentials_fail_without_caching() {
		let (broker, _, production) = offline_broker();
		let err = broker
			.application_token(&production, &[])
			.await
			.expect_err("Production has no credentials.");

		assert!(matches!(
			err,
			Error::CredentialsNotFound { ref environment } if *environment == production.id
		));
		assert!(broker.cache.is_empty());
		assert_eq!(broker.exchange_metrics.attempts(), 0);
	}

	#[tokio::test]
	async fn sources_are_stored_before_the_first_exchange() {
		let (broker, sandbox, _) = offline_broker();
		let err = broker
			.application_token(&sandbox, &["scope"])
			.await
			.expect_err("Nothing listens on the discard port.");

		assert!(matches!(err, Error::TokenExchange { .. }));
		assert!(broker.cache.contains(&sandbox.id));
		assert_eq!(broker.exchange_metrics.failures(), 1);
	}

	#[test]
	fn application_clients_require_credentials() {
		let (broker, _, _) = offline_broker();
		let stray = mock_environment("api.stray.test", "https://127.0.0.1:9");

		assert!(broker.application_client(&stray, &[]).is_err());
	}

	#[cfg(feature = "metrics")]
	#[derive(Default)]
	struct FlowLabels(Mutex<Vec<String>>);
	#[cfg(feature = "metrics")]
	impl metrics::Recorder for FlowLabels {
		fn describe_counter(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn describe_gauge(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn describe_histogram(
			&self,
			_: metrics::KeyName,
			_: Option<metrics::Unit>,
			_: metrics::SharedString,
		) {
		}

		fn register_counter(
			&self,
			key: &metrics::Key,
			_: &metrics::Metadata<'_>,
		) -> metrics::Counter {
			if key.name() == "oauth2_env_broker_flow_total" {
				let labels = key.labels().map(|label| label.value().to_owned()).collect::<Vec<_>>();

				self.0.lock().push(labels.join("/"));
			}

			metrics::Counter::noop()
		}

		fn register_gauge(&self, _: &metrics::Key, _: &metrics::Metadata<'_>) -> metrics::Gauge {
			metrics::Gauge::noop()
		}

		fn register_histogram(
			&self,
			_: &metrics::Key,
			_: &metrics::Metadata<'_>,
		) -> metrics::Histogram {
			metrics::Histogram::noop()
		}
	}

	#[cfg(feature = "metrics")]
	#[test]
	fn application_clients_record_attempt_and_outcome() {
		let (broker, sandbox, _) = offline_broker();
		let stray = mock_environment("api.stray.test", "https://127.0.0.1:9");
		let recorder = FlowLabels::default();

		metrics::with_local_recorder(&recorder, || {
			assert!(broker.application_client(&sandbox, &[]).is_ok());
			assert!(broker.application_client(&stray, &[]).is_err());
		});

		assert_eq!(
			*recorder.0.lock(),
			[
				"client_credentials/attempt",
				"client_credentials/success",
				"client_credentials/attempt",
				"client_credentials/failure",
			]
		);
	}
}
