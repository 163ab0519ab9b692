//! Crate-level error types shared by the token manager and the API client.

// self
use crate::{_prelude::*, api::ErrorResponseItem};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential material could not be loaded.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// The assertion could not be signed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// The token endpoint could not be reached or refused the exchange.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
	/// A response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while calling the API (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The API answered with an error.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Failures raised while loading the private key or identifiers.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// Input did not contain a PEM block.
	#[error("No PEM block was found in the private key input.")]
	MissingPem,
	/// PEM block label is neither `EC PRIVATE KEY` nor `PRIVATE KEY`.
	#[error("PEM label `{label}` is not a supported private key type.")]
	UnsupportedPemLabel {
		/// Label found in the PEM header.
		label: String,
	},
	/// Key bytes could not be parsed as a P-256 private key.
	#[error("Private key could not be parsed as a P-256 key: {reason}.")]
	InvalidPrivateKey {
		/// Parser-supplied reason string.
		reason: String,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// A required environment variable was not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// The private key file could not be read.
	#[error("Private key file could not be read.")]
	KeyFile(#[source] std::io::Error),
}

/// Failures raised by the signing primitive.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The JWT library rejected the claims or the key.
	#[error("Client assertion could not be signed.")]
	Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Failures raised while exchanging the assertion for an access token.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Provider rejected the client (bad assertion, unknown client, etc.).
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or crate-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider rejected the grant or scope.
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or crate-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider returned an unexpected or non-success response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns the HTTP status code associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::InvalidClient { status, .. }
			| Self::InvalidGrant { status, .. }
			| Self::TokenEndpoint { status, .. } => *status,
			Self::Network { .. } | Self::Io(_) => None,
		}
	}
}
impl From<ReqwestError> for ExchangeError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures raised while decoding response bodies.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned an empty access token.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
	/// API responded with a body that does not match the expected shape.
	#[error("API response body could not be decoded.")]
	ApiResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A request body could not be encoded.
	#[error("Request body could not be encoded.")]
	RequestBody(#[source] serde_json::Error),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// API base URL could not be parsed.
	#[error("API base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// API path could not be joined onto the base URL.
	#[error("API path `{path}` could not be joined onto the base URL.")]
	InvalidApiPath {
		/// Offending relative path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Assertion lifetime is outside the range accepted by the provider.
	#[error("Assertion lifetime must be positive and at most {max_days} days.")]
	AssertionLifetimeOutOfRange {
		/// Maximum accepted lifetime in days.
		max_days: i64,
	},
	/// A header value contains characters that are not allowed.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<crate::provider::ProviderDescriptorError> for Error {
	fn from(e: crate::provider::ProviderDescriptorError) -> Self {
		Self::Config(e.into())
	}
}

/// Transport-level failures on API calls.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request timed out.
	#[error("Request timed out while calling the API.")]
	Timeout,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Errors reported by the API itself.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// The API answered with a non-success status.
	#[error("API returned HTTP {status}{}.", summarize(errors))]
	Status {
		/// HTTP status code.
		status: u16,
		/// Error items parsed from the response body, when present.
		errors: Vec<ErrorResponseItem>,
	},
	/// The API answered with a success status but embedded an error object.
	#[error("API rejected the request{}.", summarize(errors))]
	Rejected {
		/// Error items parsed from the response body.
		errors: Vec<ErrorResponseItem>,
	},
}
impl ApiError {
	/// Returns `true` if the API reported the bearer token as unauthorized.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}
}

fn summarize(errors: &[ErrorResponseItem]) -> String {
	let messages = errors.iter().filter_map(|item| item.message.as_deref()).collect::<Vec<_>>();

	if messages.is_empty() { String::new() } else { format!(": {}", messages.join("; ")) }
}
