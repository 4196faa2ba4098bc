//! Per-environment OAuth client credentials and the resolvers that supply them.

pub mod memory;
pub mod yaml;

pub use memory::MemoryCredentials;
pub use yaml::YamlCredentials;

// self
use crate::{_prelude::*, environment::Environment, token::Secret};

/// Resolves the credential set configured for an environment.
///
/// Absence is a regular outcome: the broker turns it into
/// [`Error::CredentialsNotFound`] naming the environment.
pub trait CredentialResolver
where
	Self: Send + Sync,
{
	/// Returns the credential set for `environment`, if one is configured.
	fn resolve(&self, environment: &Environment) -> Option<&CredentialSet>;
}

/// OAuth client identity used against one environment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
	/// Application (client) identifier.
	#[serde(rename = "appid", alias = "app_id")]
	pub app_id: String,
	/// Application (client) secret.
	#[serde(rename = "certid", alias = "cert_id")]
	pub cert_id: Secret,
	/// Developer identifier, when the provider issues one.
	#[serde(rename = "devid", alias = "dev_id", default, skip_serializing_if = "Option::is_none")]
	pub dev_id: Option<String>,
	/// Redirect URI (or provider-specific redirect name) for the authorization-code flow.
	#[serde(
		rename = "redirecturi",
		alias = "redirect_uri",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub redirect_uri: Option<String>,
}
impl CredentialSet {
	/// Creates a credential set from an application id and secret.
	pub fn new(app_id: impl Into<String>, cert_id: impl Into<Secret>) -> Self {
		Self { app_id: app_id.into(), cert_id: cert_id.into(), dev_id: None, redirect_uri: None }
	}

	/// Sets the developer identifier.
	pub fn with_dev_id(mut self, dev_id: impl Into<String>) -> Self {
		self.dev_id = Some(dev_id.into());

		self
	}

	/// Sets the redirect URI used by the authorization-code flow.
	pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("app_id", &self.app_id)
			.field("cert_id", &self.cert_id)
			.field("dev_id", &self.dev_id)
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
