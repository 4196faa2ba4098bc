//! HTTP client that attaches a currently valid token to outgoing requests.

// crates.io
use reqwest::{IntoUrl, Method, RequestBuilder, header::AUTHORIZATION};
// self
use crate::{_prelude::*, environment::EnvironmentId, source::TokenSource, token::Token};

/// reqwest client bound to one environment's token source.
///
/// Every request built through [`AuthorizedClient::request`] (or authorized with
/// [`AuthorizedClient::authorize`]) asks the source for a token first, so expired tokens are
/// replaced transparently. Clones share the same source.
#[derive(Clone)]
pub struct AuthorizedClient {
	http: ReqwestClient,
	source: Arc<dyn TokenSource>,
	environment: EnvironmentId,
}
impl AuthorizedClient {
	/// Binds `http` to `source` for `environment`.
	pub fn new(http: ReqwestClient, source: Arc<dyn TokenSource>, environment: EnvironmentId) -> Self {
		Self { http, source, environment }
	}

	/// Environment whose tokens this client attaches.
	pub fn environment(&self) -> &EnvironmentId {
		&self.environment
	}

	/// Underlying reqwest client, for requests that must not carry a token.
	pub fn http(&self) -> &ReqwestClient {
		&self.http
	}

	/// Returns the token that would be attached right now.
	pub async fn token(&self) -> Result<Token> {
		self.source.token().await.map_err(|e| Error::token_exchange(&self.environment, e))
	}

	/// Adds an `Authorization` header carrying a valid token to `builder`.
	pub async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
		let token = self.token().await?;

		Ok(builder.header(AUTHORIZATION, token.authorization_header()))
	}

	/// Starts an authorized request.
	pub async fn request(&self, method: Method, url: impl IntoUrl) -> Result<RequestBuilder> {
		self.authorize(self.http.request(method, url)).await
	}

	/// Starts an authorized `GET` request.
	pub async fn get(&self, url: impl IntoUrl) -> Result<RequestBuilder> {
		self.request(Method::GET, url).await
	}

	/// Starts an authorized `POST` request.
	pub async fn post(&self, url: impl IntoUrl) -> Result<RequestBuilder> {
		self.request(Method::POST, url).await
	}
}
impl Debug for AuthorizedClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedClient").field("environment", &self.environment).finish()
	}
}
