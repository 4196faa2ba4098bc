#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_env_broker::{
	_preludet::*,
	credentials::{CredentialResolver, YamlCredentials},
	environment::{Environment, EnvironmentRegistry, PRODUCTION_ID, RegistryError, SANDBOX_ID},
	flows::{Broker, ReqwestBroker},
	oauth::ReqwestTransportErrorMapper,
};

fn registry_for(server: &MockServer) -> EnvironmentRegistry {
	EnvironmentRegistry::from_environments([
		mock_environment(MOCK_SANDBOX, &server.url("")),
		mock_environment(MOCK_PRODUCTION, &server.url("")),
	])
	.expect("Mock environments should register.")
}

fn broker_for(
	server: &MockServer,
	credentials: YamlCredentials,
) -> ReqwestBroker {
	let credentials: Arc<dyn CredentialResolver> = Arc::new(credentials);

	Broker::with_transport(
		Arc::new(registry_for(server)),
		credentials,
		test_reqwest_transport(),
		Arc::new(ReqwestTransportErrorMapper),
	)
}

#[tokio::test]
async fn yaml_with_only_a_sandbox_section_serves_only_the_sandbox() {
	let server = MockServer::start_async().await;
	let document = format!(
		"{MOCK_SANDBOX}:\n  appid: yaml-app\n  certid: yaml-cert\n  devid: yaml-dev\n  redirecturi: Yaml_RuName\n"
	);
	let credentials: YamlCredentials =
		document.parse().expect("Credential document should parse.");
	let broker = broker_for(&server, credentials);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"yaml-token\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let sandbox =
		broker.environment(MOCK_SANDBOX).expect("Sandbox should be registered.").clone();
	let production =
		broker.environment(MOCK_PRODUCTION).expect("Production should be registered.").clone();
	let token = broker
		.application_token(&sandbox, &[])
		.await
		.expect("Sandbox credentials come from the document.");
	let err = broker
		.application_token(&production, &[])
		.await
		.expect_err("Production has no section in the document.");

	assert_eq!(token.access_token.expose(), "yaml-token");
	assert!(matches!(err, Error::CredentialsNotFound { .. }));
	assert!(
		broker
			.authorization_url(&sandbox, "state", &[])
			.expect("Sandbox authorization URL should build.")
			.query_pairs()
			.any(|(key, value)| key == "redirect_uri" && value == "Yaml_RuName")
	);

	mock.assert_calls_async(1).await;
}

#[test]
fn broker_lookups_normalize_identifiers() {
	let broker = ReqwestBroker::new(
		Arc::new(EnvironmentRegistry::well_known()),
		Arc::new(YamlCredentials::default()),
	);
	let sandbox = broker
		.environment("API.Sandbox.eBay.com")
		.expect("Lookups should be case-insensitive.");

	assert_eq!(sandbox, &Environment::sandbox());
	assert_eq!(sandbox.id.as_ref(), SANDBOX_ID);
	let production = broker.environment(PRODUCTION_ID).expect("Production is well known.");

	assert_eq!(production.endpoints.token.host_str(), Some("api.ebay.com"));

	let err = broker.environment("api.unknown.test").expect_err("Unknown identifiers fail.");

	assert!(matches!(
		err,
		Error::Registry(RegistryError::UnknownEnvironment(ref id)) if id == "api.unknown.test"
	));
}

#[test]
fn well_known_endpoints_differ_per_environment() {
	let sandbox = Environment::sandbox();
	let production = Environment::production();

	assert_ne!(sandbox.id, production.id);
	assert_ne!(sandbox.endpoints.token, production.endpoints.token);
	assert_eq!(sandbox.endpoints.authorization.host_str(), Some("auth.sandbox.ebay.com"));
	assert_eq!(production.endpoints.authorization.host_str(), Some("auth.ebay.com"));
	assert_eq!(sandbox.endpoints.token.path(), "/identity/v1/oauth2/token");
}
