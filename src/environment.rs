//! Named deployment targets and their OAuth endpoints.
//!
//! An [`Environment`] pairs a stable configuration identifier with the authorization (web)
//! endpoint and the token (API) endpoint of one deployment. The [`EnvironmentRegistry`] owns
//! the fixed set a process talks to and resolves raw identifiers coming from configuration.

pub mod id;
pub mod registry;

pub use id::*;
pub use registry::*;

// self
use crate::_prelude::*;

/// Configuration identifier of the well-known sandbox environment.
pub const SANDBOX_ID: &str = "api.sandbox.ebay.com";
/// Configuration identifier of the well-known production environment.
pub const PRODUCTION_ID: &str = "api.ebay.com";

const SANDBOX_AUTHORIZATION: &str = "https://auth.sandbox.ebay.com/oauth2/authorize";
const SANDBOX_TOKEN: &str = "https://api.sandbox.ebay.com/identity/v1/oauth2/token";
const PRODUCTION_AUTHORIZATION: &str = "https://auth.ebay.com/oauth2/authorize";
const PRODUCTION_TOKEN: &str = "https://api.ebay.com/identity/v1/oauth2/token";

/// How the client secret is presented to the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint pair exposed by an environment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentEndpoints {
	/// Authorization endpoint users are redirected to during the authorization-code flow.
	pub authorization: Url,
	/// Token endpoint used for every grant.
	pub token: Url,
}

/// Immutable deployment target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
	/// Case-normalized configuration identifier.
	pub id: EnvironmentId,
	/// OAuth endpoints of the deployment.
	pub endpoints: EnvironmentEndpoints,
	/// Client authentication method for token endpoint calls.
	#[serde(default)]
	pub client_auth: ClientAuthMethod,
}
impl Environment {
	/// Creates an environment with the default client authentication method.
	pub fn new(id: EnvironmentId, authorization: Url, token: Url) -> Self {
		Self {
			id,
			endpoints: EnvironmentEndpoints { authorization, token },
			client_auth: ClientAuthMethod::default(),
		}
	}

	/// The well-known sandbox environment.
	pub fn sandbox() -> Self {
		Self::well_known(SANDBOX_ID, SANDBOX_AUTHORIZATION, SANDBOX_TOKEN)
	}

	/// The well-known production environment.
	pub fn production() -> Self {
		Self::well_known(PRODUCTION_ID, PRODUCTION_AUTHORIZATION, PRODUCTION_TOKEN)
	}

	/// Overrides the client authentication method.
	pub fn with_client_auth(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth = method;

		self
	}

	fn well_known(id: &'static str, authorization: &'static str, token: &'static str) -> Self {
		// Only called with the constants above.
		let authorization = Url::parse(authorization).expect("Well-known URL must parse.");
		let token = Url::parse(token).expect("Well-known URL must parse.");

		Self::new(EnvironmentId::from_constant(id), authorization, token)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn well_known_environments_expose_endpoints() {
		let sandbox = Environment::sandbox();
		let production = Environment::production();

		assert_eq!(sandbox.id.as_ref(), SANDBOX_ID);
		assert_eq!(sandbox.endpoints.authorization.as_str(), SANDBOX_AUTHORIZATION);
		assert_eq!(sandbox.endpoints.token.as_str(), SANDBOX_TOKEN);
		assert_eq!(production.endpoints.token.as_str(), PRODUCTION_TOKEN);
		assert_eq!(production.client_auth, ClientAuthMethod::ClientSecretBasic);
		assert_ne!(sandbox, production);
	}
}
