//! Builds the consent URL for the well-known sandbox from a YAML credential document.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use oauth2_env_broker::{
	credentials::YamlCredentials,
	environment::{EnvironmentRegistry, SANDBOX_ID},
	flows::{self, ReqwestBroker},
};

const CREDENTIALS: &str = "\
api.sandbox.ebay.com:
  appid: demo-app
  certid: demo-cert
  redirecturi: Demo_App-DemoApp-SBX-RuName
";

fn main() -> Result<()> {
	color_eyre::install()?;

	let credentials: YamlCredentials = CREDENTIALS.parse()?;
	let broker = ReqwestBroker::new(Arc::new(EnvironmentRegistry::well_known()), Arc::new(credentials));
	let sandbox = broker.environment(SANDBOX_ID)?;
	let state = flows::random_state();
	let url = broker.authorization_url(
		sandbox,
		&state,
		&["https://api.ebay.com/oauth/api_scope/sell.inventory"],
	)?;

	println!("Send your user to {url}.");
	println!("Keep `{state}` and compare it with the `state` echoed back on the redirect.");

	// Production has no section in the document, so it fails with a descriptive error.
	let production = broker.environment("api.ebay.com")?;

	if let Err(e) = broker.authorization_url(production, &state, &[]) {
		println!("{e}");
	}

	Ok(())
}
