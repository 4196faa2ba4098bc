//! Environment-aware OAuth 2.0 token issuance for clients that talk to several deployments
//! (sandbox, production) of the same API.
//!
//! The [`flows::Broker`] resolves per-environment credentials, caches one application
//! (client-credentials) token source per environment, and runs the authorization-code and
//! refresh-token grants on demand. Wire-level exchanges are delegated to the `oauth2` crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
#[cfg(feature = "reqwest")] pub mod client;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod source;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
#[doc(hidden)]
pub mod _preludet {
	//! Re-exports and mock-server helpers for tests; compiled under `cfg(test)` or the `test`
	//! feature only.

	pub use crate::_prelude::*;

	// self
	use crate::{
		credentials::{CredentialResolver, CredentialSet, MemoryCredentials},
		environment::{Environment, EnvironmentId, EnvironmentRegistry},
		flows::Broker,
		http::ReqwestTransport,
		oauth::ReqwestTransportErrorMapper,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = Broker<ReqwestTransport, ReqwestTransportErrorMapper>;

	/// Identifier of the mock sandbox environment.
	pub const MOCK_SANDBOX: &str = "api.sandbox.mock.test";
	/// Identifier of the mock production environment.
	pub const MOCK_PRODUCTION: &str = "api.mock.test";

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::from(client)
	}

	/// Builds an environment whose endpoints live under `base` (typically a mock server URL).
	pub fn mock_environment(id: &str, base: &str) -> Environment {
		let id = EnvironmentId::new(id).expect("Mock environment identifier should be valid.");
		let authorization = Url::parse(&format!("{base}/authorize"))
			.expect("Mock authorization endpoint should parse successfully.");
		let token = Url::parse(&format!("{base}/token"))
			.expect("Mock token endpoint should parse successfully.");

		Environment::new(id, authorization, token)
	}

	/// Builds a credential set with the provided application id and secret.
	pub fn mock_credentials(app_id: &str, cert_id: &str) -> CredentialSet {
		CredentialSet::new(app_id, cert_id).with_redirect_uri("https://app.example.com/callback")
	}

	/// Constructs a [`Broker`] over a registry holding a sandbox environment pointed at `base`
	/// and a production environment pointed at `production_base`. Only the sandbox receives
	/// credentials.
	pub fn build_reqwest_test_broker(
		base: &str,
		production_base: &str,
		app_id: &str,
		cert_id: &str,
	) -> (ReqwestTestBroker, Environment, Environment) {
		let sandbox = mock_environment(MOCK_SANDBOX, base);
		let production = mock_environment(MOCK_PRODUCTION, production_base);
		let mut registry = EnvironmentRegistry::default();

		registry.register(sandbox.clone()).expect("Sandbox should register once.");
		registry.register(production.clone()).expect("Production should register once.");

		let credentials: Arc<dyn CredentialResolver> = Arc::new(
			MemoryCredentials::default().with(sandbox.id.clone(), mock_credentials(app_id, cert_id)),
		);
		let broker: ReqwestTestBroker = Broker::with_transport(
			Arc::new(registry),
			credentials,
			test_reqwest_transport(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(broker, sandbox, production)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
