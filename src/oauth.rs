//! Facade over the `oauth2` crate that performs the actual token endpoint exchanges.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	environment::ClientAuthMethod,
	error::{ConfigError, ExchangeError, TransientError, TransportError},
	flows::{AuthorizationCodeConfig, ClientCredentialsConfig},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenTransport},
	token::{Secret, Token},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth 2.0 grants performed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
	/// Client Credentials grant for application tokens.
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps HTTP transport failures into [`ExchangeError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an exchange error.
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> ExchangeError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> ExchangeError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => upstream(
				format!("HTTP client failed while calling the token endpoint: {message}."),
				meta,
			),
			_ => upstream("HTTP client failed while calling the token endpoint.", meta),
		}
	}
}

/// `oauth2` client bound to one environment's token endpoint and credential set.
pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	transport: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		client_id: &str,
		client_secret: &Secret,
		client_auth: ClientAuthMethod,
		token_endpoint: &Url,
		transport: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_token_uri(TokenUrl::from_url(token_endpoint.clone()));

		if matches!(client_auth, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Self { oauth_client, transport, error_mapper }
	}

	pub(crate) fn for_client_credentials(
		config: &ClientCredentialsConfig,
		transport: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		Self::new(
			&config.client_id,
			&config.client_secret,
			config.client_auth,
			&config.token_endpoint,
			transport,
			error_mapper,
		)
	}

	pub(crate) fn for_authorization_code(
		config: &AuthorizationCodeConfig,
		transport: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		Self::new(
			&config.client_id,
			&config.client_secret,
			config.client_auth,
			&config.token_endpoint,
			transport,
			error_mapper,
		)
	}

	pub(crate) async fn exchange_client_credentials(
		&self,
		scopes: &[String],
	) -> Result<Token, ExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.transport.handle(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for scope in scopes {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request.request_async(&handle).await.map_err(|err| {
			map_request_error(
				GrantType::ClientCredentials,
				meta.take(),
				err,
				self.error_mapper.as_ref(),
			)
		})?;

		map_token_response(&response)
	}

	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: Option<&str>,
	) -> Result<Token, ExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.transport.handle(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		// Redirect values may be provider-specific names rather than URLs, so they travel as a
		// raw form parameter instead of an `oauth2::RedirectUrl`.
		if let Some(redirect_uri) = redirect_uri {
			request = request.add_extra_param("redirect_uri", redirect_uri.to_owned());
		}

		let response = request.request_async(&handle).await.map_err(|err| {
			map_request_error(
				GrantType::AuthorizationCode,
				meta.take(),
				err,
				self.error_mapper.as_ref(),
			)
		})?;

		map_token_response(&response)
	}

	pub(crate) async fn exchange_refresh_token(
		&self,
		refresh_token: &str,
		scopes: &[String],
	) -> Result<Token, ExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.transport.handle(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let mut request = self.oauth_client.exchange_refresh_token(&refresh_secret);

		for scope in scopes {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request.request_async(&handle).await.map_err(|err| {
			map_request_error(GrantType::RefreshToken, meta.take(), err, self.error_mapper.as_ref())
		})?;

		map_token_response(&response)
	}
}

/// How a rejected exchange is reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rejection {
	Grant,
	Client,
	Scope,
	Retryable,
}
impl Rejection {
	/// Classifies an OAuth `error` code or description by the well-known codes it mentions.
	fn from_oauth_text(value: &str) -> Option<Self> {
		const TABLE: [(&str, Rejection); 8] = [
			("invalid_grant", Rejection::Grant),
			("access_denied", Rejection::Grant),
			("invalid_client", Rejection::Client),
			("unauthorized_client", Rejection::Client),
			("invalid_scope", Rejection::Scope),
			("insufficient_scope", Rejection::Scope),
			("temporarily_unavailable", Rejection::Retryable),
			("server_error", Rejection::Retryable),
		];

		let lowered = value.to_ascii_lowercase();

		TABLE.iter().find(|(code, _)| lowered.contains(code)).map(|(_, rejection)| *rejection)
	}

	fn from_status(status: Option<u16>) -> Self {
		match status {
			Some(400 | 404 | 410) => Rejection::Grant,
			Some(401) => Rejection::Client,
			Some(403) => Rejection::Scope,
			_ => Rejection::Retryable,
		}
	}

	fn into_error(self, reason: String, meta: Option<&ResponseMetadata>) -> ExchangeError {
		match self {
			Rejection::Grant => ExchangeError::InvalidGrant { reason },
			Rejection::Client => ExchangeError::InvalidClient { reason },
			Rejection::Scope => ExchangeError::InsufficientScope { reason },
			Rejection::Retryable => upstream(reason, meta),
		}
	}
}

fn map_token_response(response: &BasicTokenResponse) -> Result<Token, ExchangeError> {
	// A zero or missing lifetime means the endpoint did not bound the token.
	let expires_at = match response.expires_in().filter(|lifetime| !lifetime.is_zero()) {
		Some(lifetime) => {
			let lifetime = Duration::try_from(lifetime).map_err(|_| ConfigError::ExpiryOutOfRange)?;

			Some(
				OffsetDateTime::now_utc()
					.checked_add(lifetime)
					.ok_or(ConfigError::ExpiryOutOfRange)?,
			)
		},
		None => None,
	};

	Ok(Token {
		access_token: Secret::new(response.access_token().secret().to_owned()),
		token_type: Some(response.token_type().as_ref().to_owned()),
		refresh_token: response.refresh_token().map(|secret| Secret::new(secret.secret().to_owned())),
		expires_at,
		scopes: response
			.scopes()
			.map(|scopes| scopes.iter().map(|scope| scope.as_str().to_owned()).collect()),
	})
}

fn map_request_error<E, M>(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> ExchangeError
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta),
		RequestTokenError::Request(error) => mapper.map_transport_error(grant, meta, error),
		RequestTokenError::Parse(source, _body) =>
			TransientError::MalformedResponse { source, status: meta.and_then(|m| m.status) }
				.into(),
		RequestTokenError::Other(message) =>
			upstream(format!("Token endpoint returned an unexpected response: {message}."), meta),
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> ExchangeError {
	let code = response.error().as_ref();
	let description = response.error_description().map(String::as_str);
	let rejection = Rejection::from_oauth_text(code)
		.or_else(|| description.and_then(Rejection::from_oauth_text))
		.unwrap_or_else(|| Rejection::from_status(meta.and_then(|m| m.status)));
	let reason = match description {
		Some(description) => format!("{code} ({description})"),
		None => code.to_owned(),
	};

	rejection.into_error(reason, meta)
}

fn upstream(message: impl Into<String>, meta: Option<&ResponseMetadata>) -> ExchangeError {
	TransientError::Upstream {
		message: message.into(),
		status: meta.and_then(|m| m.status),
		retry_after: meta.and_then(|m| m.retry_after),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> ExchangeError {
	if err.is_builder() {
		ConfigError::from(err).into()
	} else if err.is_timeout() {
		upstream("Token endpoint did not answer in time.", meta)
	} else {
		TransportError::from(err).into()
	}
}
