//! Token sources: values that yield a currently valid token, exchanging a new one on demand.
//!
//! [`ReuseTokenSource`] keeps the last issued token and only calls its [`TokenFetcher`] when
//! that token is missing or expired; concurrent callers of one source wait on the same
//! exchange. [`ApplicationTokenSource`] decorates another source and clears the token type
//! marker on every token it hands out.

mod exchange;

pub(crate) use exchange::*;

// self
use crate::{_prelude::*, error::ExchangeError, token::Token};

/// Boxed future returned by [`TokenSource::token`] and [`TokenFetcher::fetch`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Token, ExchangeError>> + 'a + Send>>;

/// Anything that can produce a currently valid token.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Returns a valid token, refreshing it first if needed.
	fn token(&self) -> TokenFuture<'_>;
}

/// Performs one token endpoint exchange.
pub trait TokenFetcher
where
	Self: Send + Sync,
{
	/// Exchanges for a new token; `current` is the token being replaced, if any.
	fn fetch<'a>(&'a self, current: Option<&'a Token>) -> TokenFuture<'a>;
}

/// Source that reuses its current token until it expires.
pub struct ReuseTokenSource<F> {
	current: AsyncMutex<Option<Token>>,
	fetcher: F,
}
impl<F> ReuseTokenSource<F>
where
	F: TokenFetcher,
{
	/// Creates an empty source; the first call to [`TokenSource::token`] exchanges.
	pub fn new(fetcher: F) -> Self {
		Self { current: AsyncMutex::new(None), fetcher }
	}

	/// Creates a source seeded with an existing token.
	pub fn with_token(fetcher: F, token: Token) -> Self {
		Self { current: AsyncMutex::new(Some(token)), fetcher }
	}
}
impl<F> TokenSource for ReuseTokenSource<F>
where
	F: TokenFetcher,
{
	fn token(&self) -> TokenFuture<'_> {
		Box::pin(async move {
			let mut current = self.current.lock().await;

			if let Some(token) = current.as_ref().filter(|token| token.is_valid()) {
				return Ok(token.clone());
			}

			let fresh = self.fetcher.fetch(current.as_ref()).await?;

			*current = Some(fresh.clone());

			Ok(fresh)
		})
	}
}
impl<F> Debug for ReuseTokenSource<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReuseTokenSource(..)")
	}
}

/// Source for application (client-credentials) tokens.
///
/// The token type marker is cleared on every token so downstream consumers that send the raw
/// access value (without a `Bearer` prefix) receive a bare token. Attaching the token through
/// [`Token::authorization_header`] still yields a `Bearer` header.
pub struct ApplicationTokenSource<S> {
	inner: S,
}
impl<S> ApplicationTokenSource<S>
where
	S: TokenSource,
{
	/// Wraps `inner`.
	pub fn new(inner: S) -> Self {
		Self { inner }
	}
}
impl<S> TokenSource for ApplicationTokenSource<S>
where
	S: TokenSource,
{
	fn token(&self) -> TokenFuture<'_> {
		Box::pin(async move { self.inner.token().await.map(Token::without_token_type) })
	}
}
impl<S> Debug for ApplicationTokenSource<S> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ApplicationTokenSource(..)")
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[derive(Default)]
	struct CountingFetcher {
		calls: AtomicUsize,
		lifetime: Option<Duration>,
	}
	impl CountingFetcher {
		fn lasting(lifetime: Duration) -> Self {
			Self { calls: AtomicUsize::new(0), lifetime: Some(lifetime) }
		}
	}
	impl TokenFetcher for CountingFetcher {
		fn fetch<'a>(&'a self, current: Option<&'a Token>) -> TokenFuture<'a> {
			Box::pin(async move {
				let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
				let mut token = Token::new(format!("access-{call}")).with_token_type("bearer");

				if let Some(lifetime) = self.lifetime {
					token = token.with_expires_at(OffsetDateTime::now_utc() + lifetime);
				}
				if let Some(refresh) = current.and_then(|token| token.refresh_token.clone()) {
					token = token.with_refresh_token(refresh);
				}

				Ok(token)
			})
		}
	}

	#[tokio::test]
	async fn valid_tokens_are_reused() {
		let source = ReuseTokenSource::new(CountingFetcher::lasting(Duration::hours(1)));
		let first = source.token().await.expect("First token should be issued.");
		let second = source.token().await.expect("Second token should be reused.");

		assert_eq!(first.access_token.expose(), "access-1");
		assert_eq!(second.access_token.expose(), "access-1");
		assert_eq!(source.fetcher.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn expired_tokens_trigger_exactly_one_exchange_per_call() {
		// Lifetimes inside the expiry skew are stale as soon as they are issued.
		let source = ReuseTokenSource::new(CountingFetcher::lasting(Duration::seconds(1)));

		for expected in 1..=3 {
			let token = source.token().await.expect("Expired tokens should be replaced.");

			assert_eq!(token.access_token.expose(), format!("access-{expected}"));
			assert_eq!(source.fetcher.calls.load(Ordering::SeqCst), expected);
		}
	}

	#[tokio::test]
	async fn seeded_refresh_tokens_exchange_on_first_use() {
		let source = ReuseTokenSource::with_token(
			CountingFetcher::lasting(Duration::hours(1)),
			Token::from_refresh_token("seed-refresh"),
		);
		let token = source.token().await.expect("Seeded source should exchange.");

		assert_eq!(source.fetcher.calls.load(Ordering::SeqCst), 1);
		assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("seed-refresh"));
		assert!(token.expires_at.is_some_and(|expiry| expiry > OffsetDateTime::now_utc()));
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_exchange() {
		let source = Arc::new(ReuseTokenSource::new(CountingFetcher::lasting(Duration::hours(1))));
		let mut handles = Vec::new();

		for _ in 0..8 {
			let source = source.clone();

			handles.push(tokio::spawn(async move { source.token().await }));
		}
		for handle in handles {
			let token = handle
				.await
				.expect("Task should not panic.")
				.expect("Every caller should receive a token.");

			assert_eq!(token.access_token.expose(), "access-1");
		}

		assert_eq!(source.fetcher.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn application_sources_clear_the_token_type() {
		let source =
			ApplicationTokenSource::new(ReuseTokenSource::new(CountingFetcher::default()));
		let token = source.token().await.expect("Application token should be issued.");

		assert_eq!(token.token_type, None);
		assert_eq!(token.authorization_scheme(), "Bearer");
	}
}
