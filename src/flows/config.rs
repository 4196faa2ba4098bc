//! Pure construction of per-grant OAuth configuration from credentials + environment.
//!
//! Nothing here validates credential contents or touches the network; the resulting
//! configs are handed to the [`oauth`](crate::oauth) facade.

// self
use crate::{
	_prelude::*,
	credentials::CredentialSet,
	environment::{ClientAuthMethod, Environment},
	token::Secret,
};

/// Delimiter used when joining scopes into a single `scope` parameter.
pub const SCOPE_DELIMITER: &str = " ";

/// Configuration for the client-credentials ("application token") grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentialsConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// How the secret reaches the token endpoint.
	pub client_auth: ClientAuthMethod,
	/// Token endpoint of the environment.
	pub token_endpoint: Url,
	/// Requested scopes in caller order.
	pub scopes: Vec<String>,
}

/// Configuration for the authorization-code grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationCodeConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// How the secret reaches the token endpoint.
	pub client_auth: ClientAuthMethod,
	/// Authorization endpoint users are sent to.
	pub authorization_endpoint: Url,
	/// Token endpoint of the environment.
	pub token_endpoint: Url,
	/// Redirect URI (passed through verbatim).
	pub redirect_uri: Option<String>,
	/// Requested scopes in caller order.
	pub scopes: Vec<String>,
}
impl AuthorizationCodeConfig {
	/// Builds the URL the user must visit, embedding the caller-supplied `state`.
	///
	/// An empty `state` leaves the parameter out.
	pub fn authorization_url(&self, state: &str) -> Url {
		let mut url = self.authorization_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);

		if let Some(redirect_uri) = &self.redirect_uri {
			pairs.append_pair("redirect_uri", redirect_uri);
		}
		if let Some(scope) = format_scopes(&self.scopes) {
			pairs.append_pair("scope", &scope);
		}

		if !state.is_empty() {
			pairs.append_pair("state", state);
		}

		drop(pairs);

		url
	}
}

/// Configuration for the refresh-token grant; same shape as the authorization-code config.
pub type RefreshTokenConfig = AuthorizationCodeConfig;

/// Combines credentials, environment, and scopes for the client-credentials grant.
pub fn client_credentials_config(
	credentials: &CredentialSet,
	environment: &Environment,
	scopes: &[&str],
) -> ClientCredentialsConfig {
	ClientCredentialsConfig {
		client_id: credentials.app_id.clone(),
		client_secret: credentials.cert_id.clone(),
		client_auth: environment.client_auth,
		token_endpoint: environment.endpoints.token.clone(),
		scopes: owned_scopes(scopes),
	}
}

/// Combines credentials, environment, and scopes for the authorization-code grant.
pub fn authorization_code_config(
	credentials: &CredentialSet,
	environment: &Environment,
	scopes: &[&str],
) -> AuthorizationCodeConfig {
	AuthorizationCodeConfig {
		client_id: credentials.app_id.clone(),
		client_secret: credentials.cert_id.clone(),
		client_auth: environment.client_auth,
		authorization_endpoint: environment.endpoints.authorization.clone(),
		token_endpoint: environment.endpoints.token.clone(),
		redirect_uri: credentials.redirect_uri.clone(),
		scopes: owned_scopes(scopes),
	}
}

/// Combines credentials, environment, and scopes for the refresh-token grant.
pub fn refresh_token_config(
	credentials: &CredentialSet,
	environment: &Environment,
	scopes: &[&str],
) -> RefreshTokenConfig {
	authorization_code_config(credentials, environment, scopes)
}

/// Joins scopes with [`SCOPE_DELIMITER`], or `None` when the list is empty.
pub(crate) fn format_scopes(scopes: &[String]) -> Option<String> {
	if scopes.is_empty() {
		return None;
	}

	Some(scopes.join(SCOPE_DELIMITER))
}

fn owned_scopes(scopes: &[&str]) -> Vec<String> {
	scopes.iter().map(|scope| (*scope).to_owned()).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> CredentialSet {
		CredentialSet::new("app-id", "cert-id").with_redirect_uri("App_RuName")
	}

	#[test]
	fn client_credentials_config_targets_token_endpoint() {
		let environment = Environment::sandbox();
		let config = client_credentials_config(
			&credentials(),
			&environment,
			&["https://api.ebay.com/oauth/api_scope", "scope.b"],
		);

		assert_eq!(config.client_id, "app-id");
		assert_eq!(config.client_secret.expose(), "cert-id");
		assert_eq!(config.token_endpoint, environment.endpoints.token);
		assert_eq!(config.scopes, vec!["https://api.ebay.com/oauth/api_scope", "scope.b"]);
	}

	#[test]
	fn authorization_url_embeds_state_and_scopes() {
		let environment = Environment::sandbox();
		let config = authorization_code_config(&credentials(), &environment, &["b", "a"]);
		let url = config.authorization_url("xyz123");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(url.host_str(), Some("auth.sandbox.ebay.com"));
		assert_eq!(url.path(), "/oauth2/authorize");
		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"app-id".into()));
		assert_eq!(pairs.get("redirect_uri"), Some(&"App_RuName".into()));
		assert_eq!(pairs.get("scope"), Some(&"b a".into()));
		assert_eq!(pairs.get("state"), Some(&"xyz123".into()));
	}

	#[test]
	fn empty_scopes_are_omitted() {
		let config =
			authorization_code_config(&CredentialSet::new("a", "b"), &Environment::production(), &[]);
		let url = config.authorization_url("s");

		assert!(url.query_pairs().all(|(key, _)| key != "scope" && key != "redirect_uri"));
		assert_eq!(format_scopes(&[]), None);
	}

	#[test]
	fn empty_state_is_omitted() {
		let config = authorization_code_config(&credentials(), &Environment::sandbox(), &[]);
		let url = config.authorization_url("");

		assert!(url.query_pairs().all(|(key, _)| key != "state"));
		assert!(url.query_pairs().any(|(key, _)| key == "client_id"));
	}

	#[test]
	fn refresh_config_matches_authorization_code_shape() {
		let environment = Environment::production();

		assert_eq!(
			refresh_token_config(&credentials(), &environment, &["x"]),
			authorization_code_config(&credentials(), &environment, &["x"]),
		);
	}
}
