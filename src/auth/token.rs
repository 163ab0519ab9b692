//! Access-token record cached by the exchanger.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token issued by the identity provider together with its derived expiry.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer token secret; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Token type reported by the provider (normally `Bearer`).
	pub token_type: String,
	/// Scope echoed by the provider, if any.
	pub scope: Option<String>,
	/// Lifetime advertised in the response's `expires_in`.
	pub expires_in: Duration,
	/// Instant the response was received.
	pub issued_at: OffsetDateTime,
	/// `issued_at + expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a record received at `issued_at` that lives for `expires_in`.
	pub fn new(
		secret: TokenSecret,
		token_type: impl Into<String>,
		scope: Option<String>,
		expires_in: Duration,
		issued_at: OffsetDateTime,
	) -> Self {
		Self {
			secret,
			token_type: token_type.into(),
			scope,
			expires_in,
			issued_at,
			expires_at: issued_at.saturating_add(expires_in),
		}
	}

	/// Returns `true` if the token is non-empty and `instant` is strictly before its expiry.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		!self.secret.is_empty() && instant < self.expires_at
	}

	/// Time left until expiry at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		(self.expires_at - instant).max(Duration::ZERO)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
