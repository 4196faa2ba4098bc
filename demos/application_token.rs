//! Issues a cached application token for a sandbox-like environment served by a local mock
//! token endpoint, then shows that the second call is answered from the cache.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_env_broker::{
	credentials::{CredentialResolver, CredentialSet, MemoryCredentials},
	environment::{Environment, EnvironmentId, EnvironmentRegistry},
	flows::{Broker, ReqwestBroker},
	http::ReqwestTransport,
	oauth::ReqwestTransportErrorMapper,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-application\",\"token_type\":\"Application Access Token\",\"expires_in\":7200}",
			);
		})
		.await;
	let sandbox = Environment::new(
		EnvironmentId::new("api.sandbox.demo.test")?,
		Url::parse(&server.url("/authorize"))?,
		Url::parse(&server.url("/token"))?,
	);
	let credentials: Arc<dyn CredentialResolver> = Arc::new(
		MemoryCredentials::default()
			.with(sandbox.id.clone(), CredentialSet::new("demo-app", "demo-cert")),
	);
	let transport = ReqwestTransport::from(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let broker: ReqwestBroker = Broker::with_transport(
		Arc::new(EnvironmentRegistry::from_environments([sandbox.clone()])?),
		credentials,
		transport,
		Arc::new(ReqwestTransportErrorMapper),
	);
	let scopes = ["https://api.ebay.com/oauth/api_scope"];
	let first = broker.application_token(&sandbox, &scopes).await?;
	let second = broker.application_token(&sandbox, &scopes).await?;

	println!("Authorization header: {}.", first.authorization_header());
	println!(
		"Second call reused the cached token: {}.",
		first.access_token.expose() == second.access_token.expose()
	);

	token_mock.assert_calls_async(1).await;

	Ok(())
}
