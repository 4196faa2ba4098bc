//! HTTP transports used for token endpoint exchanges.
//!
//! The broker never talks to an HTTP stack directly. Each exchange asks a [`TokenTransport`]
//! for an [`AsyncHttpClient`] handle bound to a fresh [`ResponseMetadataSlot`]; the handle
//! writes the response status and Retry-After hint there so the error mapper can classify a
//! failure without knowing which HTTP crate produced it.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// HTTP stack capable of executing OAuth token exchanges.
pub trait TokenTransport
where
	Self: 'static + Send + Sync,
{
	/// Error produced by the underlying HTTP stack.
	type TransportError: 'static + Send + Sync + StdError;

	/// Per-exchange client handed to `oauth2`.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle that reports into `slot`.
	///
	/// The handle clears `slot` before sending and fills it once the status line arrives.
	fn handle(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Status and Retry-After hint of a token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code, when a response was received.
	pub status: Option<u16>,
	/// Delay the endpoint asked for before the next attempt.
	pub retry_after: Option<Duration>,
}

/// Shared cell a transport handle writes [`ResponseMetadata`] into.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Replaces the stored metadata.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Takes the stored metadata, leaving the slot empty.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Default transport backed by a [`ReqwestClient`].
///
/// [`AuthorizedClient`](crate::client::AuthorizedClient)s built by the broker reuse this
/// client for API calls, so timeouts and proxies only need configuring once.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
	client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Client used for exchanges and authorized requests.
	pub fn client(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestClient> for ReqwestTransport {
	fn from(client: ReqwestClient) -> Self {
		Self { client }
	}
}
#[cfg(feature = "reqwest")]
impl TokenTransport for ReqwestTransport {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ReqwestHandle { client: self.client.clone(), slot }
	}
}

/// [`AsyncHttpClient`] produced by [`ReqwestTransport`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
#[cfg(feature = "reqwest")]
impl ReqwestHandle {
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError<ReqwestError>> {
		self.slot.take();

		let request = reqwest::Request::try_from(request).map_err(Box::new)?;
		let response = self.client.execute(request).await.map_err(Box::new)?;
		let status = response.status();
		let headers = response.headers().clone();

		self.slot.store(ResponseMetadata {
			status: Some(status.as_u16()),
			retry_after: retry_after(&headers),
		});

		let body = response.bytes().await.map_err(Box::new)?;
		let mut converted = HttpResponse::new(body.to_vec());

		*converted.status_mut() = status;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(self.send(request))
	}
}

/// Reads `Retry-After` as either delta seconds or an HTTP date in the future.
#[cfg(feature = "reqwest")]
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	match value.parse::<i64>() {
		Ok(seconds) if seconds >= 0 => Some(Duration::seconds(seconds)),
		Ok(_) => None,
		Err(_) => {
			let remaining =
				OffsetDateTime::parse(value, &Rfc2822).ok()? - OffsetDateTime::now_utc();

			remaining.is_positive().then_some(remaining)
		},
	}
}
