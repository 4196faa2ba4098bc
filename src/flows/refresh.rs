//! Refresh-token exchanges for tokens the caller persisted earlier.
//!
//! The caller's refresh value is wrapped in a token whose expiry has already elapsed, so the
//! source built around it performs exactly one refresh exchange on first use. Nothing here is
//! cached by the broker.

// self
use crate::{
	_prelude::*,
	environment::Environment,
	flows::{self, Broker, RefreshTokenConfig, config},
	http::TokenTransport,
	oauth::{BasicFacade, GrantType, TransportErrorMapper},
	source::{RefreshTokenFetcher, ReuseTokenSource, TokenSource},
	token::Token,
};
#[cfg(feature = "reqwest")]
use crate::{client::AuthorizedClient, flows::ReqwestBroker};

const GRANT: GrantType = GrantType::RefreshToken;

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Redeems `refresh_token` for a fresh token in `environment`.
	///
	/// When the endpoint does not rotate the refresh value, the returned token carries the one
	/// that was passed in.
	pub async fn token_from_refresh_token(
		&self,
		environment: &Environment,
		refresh_token: &str,
		scopes: &[&str],
	) -> Result<Token> {
		flows::observed(GRANT, "token_from_refresh_token", &environment.id, async move {
			self.redeem_refresh_token(environment, refresh_token, scopes)
				.await
				.map(|(token, _)| token)
		})
		.await
	}

	pub(crate) fn refresh_source(
		&self,
		config: &RefreshTokenConfig,
		seed: Token,
	) -> ReuseTokenSource<RefreshTokenFetcher<C, M>> {
		let facade = BasicFacade::for_authorization_code(
			config,
			self.transport.clone(),
			self.transport_mapper.clone(),
		);
		let fetcher =
			RefreshTokenFetcher::new(facade, config.scopes.clone(), self.exchange_metrics.clone());

		ReuseTokenSource::with_token(fetcher, seed)
	}

	async fn redeem_refresh_token(
		&self,
		environment: &Environment,
		refresh_token: &str,
		scopes: &[&str],
	) -> Result<(Token, Arc<dyn TokenSource>)> {
		let credentials = self.credentials_for(environment)?;
		let config = config::refresh_token_config(credentials, environment, scopes);
		let source: Arc<dyn TokenSource> =
			Arc::new(self.refresh_source(&config, Token::from_refresh_token(refresh_token)));
		let token = source.token().await.map_err(|e| Error::token_exchange(&environment.id, e))?;

		Ok((token, source))
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestBroker {
	/// Redeems `refresh_token` and returns the token plus a client that keeps it fresh.
	pub async fn client_from_refresh_token(
		&self,
		environment: &Environment,
		refresh_token: &str,
		scopes: &[&str],
	) -> Result<(Token, AuthorizedClient)> {
		flows::observed(GRANT, "client_from_refresh_token", &environment.id, async move {
			let (token, source) =
				self.redeem_refresh_token(environment, refresh_token, scopes).await?;

			Ok((token, self.authorized_client(environment, source)))
		})
		.await
	}
}
