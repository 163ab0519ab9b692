//! HTTP seam for the token exchange.
//!
//! The exchanger never talks to reqwest directly. It asks a [`TokenHttpClient`] for a
//! short-lived `oauth2` handle per exchange and hands that handle a fresh
//! [`ResponseMetadataSlot`]. The handle records the status and `Retry-After` hint of the
//! token endpoint's answer in the slot, and error mapping reads them back once `oauth2`
//! has given up on the response. Tests substitute their own client through the same seam.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::ConfigError};

type HandleFuture<'c, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'c + Send + Sync>>;

/// Transport used by the exchanger to reach the token endpoint.
///
/// Implementations are shared behind an `Arc` for the exchanger's lifetime, while handles
/// live for one exchange. Handle futures must be `Send` because exchanges run inside
/// boxed `Send` futures.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Error produced by the underlying HTTP stack.
	type TransportError: 'static + Send + Sync + StdError;

	/// `oauth2` client handle bound to one [`ResponseMetadataSlot`].
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
	/// Handles clear the slot with [`ResponseMetadataSlot::take`] before sending and call
	/// [`ResponseMetadataSlot::store`] as soon as the response head is available, whether
	/// or not the status is a success.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Status and retry hint of the last token-endpoint response.
///
/// Construct with field names; more fields may be added.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status.
	pub status: Option<u16>,
	/// `Retry-After` as a relative delay.
	pub retry_after: Option<Duration>,
}

/// Shared cell carrying [`ResponseMetadata`] from the handle to error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Replaces the recorded metadata.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Removes and returns the recorded metadata.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// reqwest-backed [`TokenHttpClient`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects and gives up after `timeout`.
	///
	/// The token endpoint answers directly; a redirect would re-post the assertion to
	/// another origin.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).timeout(timeout).build()?;

		Ok(Self(client))
	}

	/// Wraps a caller-configured client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ReqwestHandle { client: self.0.clone(), slot }
	}
}

/// Per-exchange handle produced by [`ReqwestHttpClient`].
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future = HandleFuture<'c, ReqwestError>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let request: reqwest::Request = request.try_into().map_err(Box::new)?;
			let response = self.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().clone();

			self.slot.store(ResponseMetadata {
				status: Some(status.as_u16()),
				retry_after: retry_after(&headers, OffsetDateTime::now_utc()),
			});

			let body = response.bytes().await.map_err(Box::new)?;
			let mut answer = HttpResponse::new(body.to_vec());

			*answer.status_mut() = status;
			*answer.headers_mut() = headers;

			Ok(answer)
		})
	}
}

/// Reads `Retry-After` as delta-seconds or an HTTP date relative to `now`.
fn retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

	if let Ok(seconds) = raw.parse::<u32>() {
		return Some(Duration::seconds(seconds.into()));
	}

	let delay = OffsetDateTime::parse(raw, &Rfc2822).ok()? - now;

	delay.is_positive().then_some(delay)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, value.parse().expect("Header value should parse."));

		headers
	}

	#[test]
	fn retry_after_reads_seconds_and_dates() {
		let now = datetime!(2015-10-21 07:28:00 UTC);

		assert_eq!(retry_after(&headers("120"), now), Some(Duration::seconds(120)));
		assert_eq!(
			retry_after(&headers("Wed, 21 Oct 2015 07:29:30 GMT"), now),
			Some(Duration::seconds(90))
		);
	}

	#[test]
	fn retry_after_ignores_past_dates_and_garbage() {
		let now = datetime!(2015-10-21 07:28:00 UTC);

		assert_eq!(retry_after(&headers("Wed, 21 Oct 2015 07:27:00 GMT"), now), None);
		assert_eq!(retry_after(&headers("soon"), now), None);
		assert_eq!(retry_after(&HeaderMap::new(), now), None);
	}

	#[test]
	fn slot_hands_metadata_over_once() {
		let slot = ResponseMetadataSlot::default();
		let handle = ReqwestHttpClient::default().with_metadata(slot.clone());

		handle.slot.store(ResponseMetadata { status: Some(401), retry_after: None });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(401));
		assert!(slot.take().is_none());
	}

	#[test]
	fn timeout_client_builds() {
		ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(30))
			.expect("Client with timeout should build.");
	}
}
