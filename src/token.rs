//! Issued OAuth tokens and their validity rules.

pub mod secret;

pub use secret::*;

// self
use crate::_prelude::*;

/// Issued credential returned to callers; never persisted by the broker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Access token value.
	pub access_token: Secret,
	/// Token type marker reported by the token endpoint (usually `bearer`).
	///
	/// Application tokens have this marker cleared; see
	/// [`ApplicationTokenSource`](crate::source::ApplicationTokenSource).
	pub token_type: Option<String>,
	/// Refresh token value, if one was issued.
	pub refresh_token: Option<Secret>,
	/// Expiry instant; `None` means the token does not expire.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes echoed back by the token endpoint, if any.
	pub scopes: Option<Vec<String>>,
}
impl Token {
	/// Tokens are treated as expired this long before their actual expiry.
	pub const EXPIRY_SKEW: Duration = Duration::seconds(10);

	/// Creates a token holding only an access value.
	pub fn new(access_token: impl Into<Secret>) -> Self {
		Self {
			access_token: access_token.into(),
			token_type: None,
			refresh_token: None,
			expires_at: None,
			scopes: None,
		}
	}

	/// Creates a token seeded with only a refresh value and an already-elapsed expiry.
	///
	/// A source holding this token performs a refresh exchange on its first use.
	pub fn from_refresh_token(refresh_token: impl Into<Secret>) -> Self {
		Self {
			access_token: Secret::new(String::new()),
			token_type: None,
			refresh_token: Some(refresh_token.into()),
			expires_at: Some(OffsetDateTime::now_utc()),
			scopes: None,
		}
	}

	/// Sets the token type marker.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the refresh value.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<Secret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Clears the token type marker.
	pub fn without_token_type(mut self) -> Self {
		self.token_type = None;

		self
	}

	/// Returns true if the token carries an access value that is not expired at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		!self.access_token.is_empty() && !self.is_expired_at(instant)
	}

	/// Returns true if the token is usable right now.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Returns true if the expiry (minus [`Self::EXPIRY_SKEW`]) has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		match self.expires_at {
			Some(expires_at) => expires_at - Self::EXPIRY_SKEW <= instant,
			None => false,
		}
	}

	/// Authorization scheme used when attaching the token to requests.
	///
	/// Defaults to `Bearer` when the type marker is absent, and normalizes the common
	/// lowercase spellings returned by token endpoints.
	pub fn authorization_scheme(&self) -> &str {
		match self.token_type.as_deref() {
			None | Some("") => "Bearer",
			Some(kind) if kind.eq_ignore_ascii_case("bearer") => "Bearer",
			Some(kind) if kind.eq_ignore_ascii_case("mac") => "MAC",
			Some(kind) if kind.eq_ignore_ascii_case("basic") => "Basic",
			Some(kind) => kind,
		}
	}

	/// Value for an `Authorization` header. Callers must avoid logging this string.
	pub fn authorization_header(&self) -> String {
		format!("{} {}", self.authorization_scheme(), self.access_token.expose())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("scopes", &self.scopes)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validity_honors_expiry_skew() {
		let now = OffsetDateTime::now_utc();
		let fresh = Token::new("access").with_expires_at(now + Duration::minutes(5));
		let almost = Token::new("access").with_expires_at(now + Duration::seconds(5));
		let forever = Token::new("access");

		assert!(fresh.is_valid_at(now));
		assert!(!almost.is_valid_at(now));
		assert!(forever.is_valid_at(now));
		assert!(!Token::new("").is_valid_at(now));
	}

	#[test]
	fn refresh_seed_is_never_valid() {
		let seed = Token::from_refresh_token("refresh-value");

		assert!(!seed.is_valid());
		assert_eq!(seed.refresh_token.as_ref().map(Secret::expose), Some("refresh-value"));
	}

	#[test]
	fn authorization_scheme_defaults_to_bearer() {
		let token = Token::new("abc");

		assert_eq!(token.authorization_header(), "Bearer abc");
		assert_eq!(token.clone().with_token_type("bearer").authorization_scheme(), "Bearer");
		assert_eq!(token.with_token_type("Application").authorization_scheme(), "Application");
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let token = Token::new("access-secret").with_refresh_token("refresh-secret");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
	}
}
