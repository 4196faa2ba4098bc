//! Authorization-code helpers: building the consent URL and redeeming the returned code.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	environment::Environment,
	flows::{self, AuthorizationCodeConfig, Broker, config},
	http::TokenTransport,
	oauth::{BasicFacade, GrantType, TransportErrorMapper},
	obs::{self, FlowOutcome, FlowSpan},
	token::Token,
};
#[cfg(feature = "reqwest")]
use crate::{client::AuthorizedClient, flows::ReqwestBroker};

const GRANT: GrantType = GrantType::AuthorizationCode;
const STATE_LEN: usize = 32;

/// Generates a random alphanumeric `state` value for callers without their own.
///
/// The broker never stores or checks it; matching the value echoed back on the redirect is the
/// caller's job.
pub fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the URL the user must visit to grant consent in `environment`.
	///
	/// The URL carries the configured redirect URI, the requested scopes and `state`
	/// verbatim. No network call is made.
	pub fn authorization_url(
		&self,
		environment: &Environment,
		state: &str,
		scopes: &[&str],
	) -> Result<Url> {
		FlowSpan::new(GRANT, "authorization_url", &environment.id).in_scope(|| {
			obs::record_flow_outcome(GRANT, FlowOutcome::Attempt);

			let result = self.credentials_for(environment).map(|credentials| {
				config::authorization_code_config(credentials, environment, scopes)
					.authorization_url(state)
			});

			obs::record_flow_outcome(GRANT, FlowOutcome::of(&result));

			result
		})
	}

	/// Exchanges an authorization `code` for a token.
	///
	/// Codes are single-use; a second exchange of the same code fails at the token endpoint.
	pub async fn exchange_code(&self, environment: &Environment, code: &str) -> Result<Token> {
		flows::observed(GRANT, "exchange_code", &environment.id, async move {
			self.redeem_code(environment, code).await.map(|(token, _)| token)
		})
		.await
	}

	async fn redeem_code(
		&self,
		environment: &Environment,
		code: &str,
	) -> Result<(Token, AuthorizationCodeConfig)> {
		let credentials = self.credentials_for(environment)?;
		let config = config::authorization_code_config(credentials, environment, &[]);
		let facade = BasicFacade::for_authorization_code(
			&config,
			self.transport.clone(),
			self.transport_mapper.clone(),
		);

		self.exchange_metrics.record_attempt();

		let result =
			facade.exchange_authorization_code(code, config.redirect_uri.as_deref()).await;

		self.exchange_metrics.record(&result);

		let token = result.map_err(|e| Error::token_exchange(&environment.id, e))?;

		Ok((token, config))
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestBroker {
	/// Exchanges `code` and returns the token plus a client that refreshes it when it expires.
	pub async fn exchange_code_for_client(
		&self,
		environment: &Environment,
		code: &str,
	) -> Result<(Token, AuthorizedClient)> {
		flows::observed(GRANT, "exchange_code_for_client", &environment.id, async move {
			let (token, config) = self.redeem_code(environment, code).await?;
			let source = Arc::new(self.refresh_source(&config, token.clone()));

			Ok((token, self.authorized_client(environment, source)))
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn random_states_are_alphanumeric_and_distinct() {
		let first = random_state();
		let second = random_state();

		assert_eq!(first.len(), STATE_LEN);
		assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first, second);
	}
}
