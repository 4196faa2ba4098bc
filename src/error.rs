//! Broker-level error types shared across environments, credential sources, and flows.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	environment::{EnvironmentId, RegistryError},
};

/// Result alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Error returned by every broker operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// No credential set is configured for the requested environment.
	#[error("Unable to retrieve credentials for the `{environment}` environment.")]
	CredentialsNotFound {
		/// Configuration identifier of the environment.
		environment: EnvironmentId,
	},
	/// The token endpoint exchange failed.
	#[error("Unable to generate a token for the `{environment}` environment.")]
	TokenExchange {
		/// Configuration identifier of the environment.
		environment: EnvironmentId,
		/// Underlying protocol failure.
		#[source]
		source: ExchangeError,
	},
	/// The credential document could not be read or parsed.
	#[error(transparent)]
	Load(#[from] LoadError),
	/// Environment registration or lookup failed.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// The HTTP stack could not be set up.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Wraps a protocol failure with the environment it happened in.
	pub fn token_exchange(environment: &EnvironmentId, source: ExchangeError) -> Self {
		Self::TokenExchange { environment: environment.clone(), source }
	}

	/// Returns the environment identifier attached to the error, if any.
	pub fn environment(&self) -> Option<&EnvironmentId> {
		match self {
			Self::CredentialsNotFound { environment } | Self::TokenExchange { environment, .. } =>
				Some(environment),
			_ => None,
		}
	}
}

/// Failures raised while loading a credential document.
#[derive(Debug, ThisError)]
pub enum LoadError {
	/// The credential file could not be read.
	#[error("Failed to read credentials from {}.", .path.display())]
	Io {
		/// Path that failed to load.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// The credential document is not valid YAML or has the wrong shape.
	#[error("Credential document is malformed at `{}`.", .0.path())]
	Parse(#[from] serde_path_to_error::Error<serde_yaml::Error>),
	/// Two section keys normalize to the same environment identifier.
	#[error("Credential document contains more than one `{0}` section.")]
	DuplicateSection(EnvironmentId),
}

/// Failures surfaced by a token endpoint exchange.
///
/// Protocol rejections are classified from the OAuth `error` code first, then the
/// `error_description`, then the HTTP status.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// The request could not be built or the response could not be represented locally.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The token endpoint failed in a way that may succeed on a later attempt.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// The token endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token endpoint refused the requested scopes.
	#[error("Token endpoint refused the requested scopes: {reason}.")]
	InsufficientScope {
		/// Explanation returned by the token endpoint.
		reason: String,
	},
	/// The authorization code or refresh value was rejected (expired, revoked, or reused).
	#[error("Token endpoint rejected the code or refresh value: {reason}.")]
	InvalidGrant {
		/// Explanation returned by the token endpoint.
		reason: String,
	},
	/// The application id or secret was rejected.
	#[error("Token endpoint rejected the application credentials: {reason}.")]
	InvalidClient {
		/// Explanation returned by the token endpoint.
		reason: String,
	},
	/// A refresh was required but the token carries no refresh value.
	#[error("Token has no refresh value to exchange.")]
	MissingRefreshToken,
}

/// Local failures that no retry can fix.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The HTTP stack refused to build the token request.
	#[error("Token request could not be built.")]
	RequestBuild {
		/// Error reported by the HTTP stack.
		#[source]
		source: BoxError,
	},
	/// The request produced by `oauth2` is not a valid HTTP request.
	#[error(transparent)]
	InvalidRequest(#[from] oauth2::http::Error),
	/// `expires_in` does not fit into a timestamp.
	#[error("Token lifetime of the response is out of range.")]
	ExpiryOutOfRange,
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::RequestBuild { source: Box::new(e) }
	}
}

/// Token endpoint failures that may clear up on their own.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// The endpoint answered with an error that does not name a rejected grant or client.
	#[error("{message}")]
	Upstream {
		/// Human-readable summary.
		message: String,
		/// HTTP status of the response, if one arrived.
		status: Option<u16>,
		/// Delay suggested by a `Retry-After` header.
		retry_after: Option<Duration>,
	},
	/// The endpoint answered with a body that is not a token response.
	#[error("Token endpoint response could not be parsed at `{}`.", .source.path())]
	MalformedResponse {
		/// JSON error with the path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response.
		status: Option<u16>,
	},
}
impl TransientError {
	/// HTTP status of the failed response, if one arrived.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Upstream { status, .. } | Self::MalformedResponse { status, .. } => *status,
		}
	}
}

/// The token endpoint could not be reached.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection, TLS, or protocol failure inside the HTTP stack.
	#[error("Could not reach the token endpoint.")]
	Network {
		/// Error reported by the HTTP stack.
		#[source]
		source: BoxError,
	},
	/// Local I/O failure while talking to the token endpoint.
	#[error("I/O failure while talking to the token endpoint.")]
	Io(#[from] std::io::Error),
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::Network { source: Box::new(e) }
	}
}
