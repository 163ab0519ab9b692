//! Shared cache-state vocabulary and the bearer-token seam consumed by the API client.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed, sendable future returned by [`TokenSource`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Lifecycle of a cached artifact (signed assertion or access token).
///
/// `Expired` behaves like `Absent` for regeneration; it only differs in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactState {
	/// Nothing cached yet, or the cache was invalidated.
	Absent,
	/// Cached artifact may be served as-is.
	Valid,
	/// Cached artifact exists but must be regenerated.
	Expired,
}
impl ArtifactState {
	/// Returns `true` if the cached artifact can be served.
	pub const fn is_valid(self) -> bool {
		matches!(self, Self::Valid)
	}
}

/// Supplies bearer tokens to outbound API calls.
///
/// Implementations must be safe to share across concurrently running requests.
pub trait TokenSource: Send + Sync {
	/// Returns a bearer token that is valid right now.
	fn access_token(&self) -> BoxFuture<'_, Result<TokenSecret>>;

	/// Drops any cached token so the next [`access_token`](TokenSource::access_token) call
	/// obtains a fresh one.
	fn invalidate(&self) -> BoxFuture<'_, ()>;
}
impl<T> TokenSource for Arc<T>
where
	T: ?Sized + TokenSource,
{
	fn access_token(&self) -> BoxFuture<'_, Result<TokenSecret>> {
		(**self).access_token()
	}

	fn invalidate(&self) -> BoxFuture<'_, ()> {
		(**self).invalidate()
	}
}

/// Token source wrapping a caller-supplied bearer token.
///
/// The token is served unchanged; invalidation is a no-op because there is nothing to
/// regenerate.
#[derive(Clone, Debug)]
pub struct StaticTokenSource(TokenSecret);
impl StaticTokenSource {
	/// Wraps `token`.
	pub fn new(token: impl Into<String>) -> Self {
		Self(TokenSecret::new(token))
	}
}
impl TokenSource for StaticTokenSource {
	fn access_token(&self) -> BoxFuture<'_, Result<TokenSecret>> {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}

	fn invalidate(&self) -> BoxFuture<'_, ()> {
		Box::pin(async {})
	}
}
