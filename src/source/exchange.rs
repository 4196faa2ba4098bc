// self
use crate::{
	_prelude::*,
	error::ExchangeError,
	flows::ExchangeMetrics,
	http::TokenTransport,
	oauth::{BasicFacade, TransportErrorMapper},
	source::{TokenFetcher, TokenFuture},
	token::Token,
};

/// Fetcher that runs the client-credentials grant on every call.
pub(crate) struct ClientCredentialsFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	facade: BasicFacade<C, M>,
	scopes: Vec<String>,
	metrics: Arc<ExchangeMetrics>,
}
impl<C, M> ClientCredentialsFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		facade: BasicFacade<C, M>,
		scopes: Vec<String>,
		metrics: Arc<ExchangeMetrics>,
	) -> Self {
		Self { facade, scopes, metrics }
	}
}
impl<C, M> TokenFetcher for ClientCredentialsFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch<'a>(&'a self, _current: Option<&'a Token>) -> TokenFuture<'a> {
		Box::pin(async move {
			self.metrics.record_attempt();

			let result = self.facade.exchange_client_credentials(&self.scopes).await;

			self.metrics.record(&result);

			result
		})
	}
}

/// Fetcher that redeems the refresh value of the token being replaced.
pub(crate) struct RefreshTokenFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	facade: BasicFacade<C, M>,
	scopes: Vec<String>,
	metrics: Arc<ExchangeMetrics>,
}
impl<C, M> RefreshTokenFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		facade: BasicFacade<C, M>,
		scopes: Vec<String>,
		metrics: Arc<ExchangeMetrics>,
	) -> Self {
		Self { facade, scopes, metrics }
	}
}
impl<C, M> TokenFetcher for RefreshTokenFetcher<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch<'a>(&'a self, current: Option<&'a Token>) -> TokenFuture<'a> {
		Box::pin(async move {
			let refresh_token = current
				.and_then(|token| token.refresh_token.clone())
				.filter(|secret| !secret.is_empty())
				.ok_or(ExchangeError::MissingRefreshToken)?;

			self.metrics.record_attempt();

			let result = self
				.facade
				.exchange_refresh_token(refresh_token.expose(), &self.scopes)
				.await
				.map(|mut token| {
					// Endpoints that do not rotate refresh values omit them from the response.
					if token.refresh_token.is_none() {
						token.refresh_token = Some(refresh_token);
					}

					token
				});

			self.metrics.record(&result);

			result
		})
	}
}
