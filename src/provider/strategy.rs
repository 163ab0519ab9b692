//! Classification of token-endpoint failures.
//!
//! The exchanger hands every non-success answer to a [`ProviderStrategy`], which decides
//! whether the credentials are at fault (rejected client or grant) or whether a later
//! attempt may succeed. The strategy only sees crate-owned data so it stays independent
//! of the HTTP stack.

// self
use crate::_prelude::*;

const BODY_PREVIEW_LIMIT: usize = 256;
const OAUTH_CODES: [(&str, ProviderErrorKind); 7] = [
	("invalid_client", ProviderErrorKind::InvalidClient),
	("unauthorized_client", ProviderErrorKind::InvalidClient),
	("invalid_grant", ProviderErrorKind::InvalidGrant),
	("invalid_scope", ProviderErrorKind::InvalidGrant),
	("access_denied", ProviderErrorKind::InvalidGrant),
	("unsupported_grant_type", ProviderErrorKind::InvalidGrant),
	("temporarily_unavailable", ProviderErrorKind::Transient),
];

/// Hooks for classifying token errors and decorating token requests.
pub trait ProviderStrategy: Send + Sync {
	/// Maps a failed token request onto [`ProviderErrorKind`].
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Adds form fields to the token request.
	///
	/// `grant_type`, `client_id`, `client_secret`, and `scope` are owned by the exchanger and
	/// are dropped if inserted here.
	fn augment_token_request(&self, _form: &mut BTreeMap<String, String>) {}
}

/// Failure categories for token requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The grant or scope was refused.
	InvalidGrant,
	/// The client was refused: unknown client, revoked key, or a bad or expired assertion.
	InvalidClient,
	/// A later attempt may succeed.
	Transient,
}
impl ProviderErrorKind {
	/// Looks up a standard OAuth `error` code, ignoring ASCII case.
	pub fn from_oauth_code(code: &str) -> Option<Self> {
		let code = code.trim();

		OAUTH_CODES
			.iter()
			.find(|(known, _)| known.eq_ignore_ascii_case(code))
			.map(|(_, kind)| *kind)
	}

	fn mentioned_in(text: &str) -> Option<Self> {
		let text = text.to_ascii_lowercase();

		OAUTH_CODES.iter().find(|(known, _)| text.contains(known)).map(|(_, kind)| *kind)
	}

	fn from_status(status: u16) -> Self {
		match status {
			401 => Self::InvalidClient,
			400 | 403 | 404 | 410 => Self::InvalidGrant,
			_ => Self::Transient,
		}
	}
}

/// What is known about a failed token request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status of the answer.
	pub http_status: Option<u16>,
	/// OAuth `error` field.
	pub oauth_error: Option<String>,
	/// OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Leading characters of a body that was not an OAuth error document.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the HTTP status.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Sets the OAuth `error` field.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Sets the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Stores at most 256 characters of `body`, marking a cut with `…`.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		let mut body = body.into();

		if let Some((cut, _)) = body.char_indices().nth(BODY_PREVIEW_LIMIT) {
			body.truncate(cut);
			body.push('…');
		}

		self.body_preview = Some(body);

		self
	}
}

/// Classifies by the OAuth `error` code, then by codes mentioned in the description or
/// body, then by HTTP status. Unknown answers are treated as transient.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		ctx.oauth_error
			.as_deref()
			.and_then(ProviderErrorKind::from_oauth_code)
			.or_else(|| ctx.error_description.as_deref().and_then(ProviderErrorKind::mentioned_in))
			.or_else(|| ctx.body_preview.as_deref().and_then(ProviderErrorKind::mentioned_in))
			.or_else(|| ctx.http_status.map(ProviderErrorKind::from_status))
			.unwrap_or(ProviderErrorKind::Transient)
	}
}
