//! Provider descriptor and its validating builder.

// std
use std::net::IpAddr;
// self
use crate::_prelude::*;

/// Token endpoint of Apple's identity provider.
pub const APPLE_TOKEN_ENDPOINT: &str = "https://appleid.apple.com/auth/oauth2/token";
/// Audience expected in client assertions.
pub const APPLE_AUDIENCE: &str = "https://appleid.apple.com";
/// Scope granting access to the Search Ads organization APIs.
pub const SEARCH_ADS_SCOPE: &str = "searchadsorg";

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Token endpoint must use HTTPS (plain HTTP is allowed for loopback hosts only).
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The audience claim cannot be empty.
	#[error("Assertion audience cannot be empty.")]
	EmptyAudience,
	/// The scope must be a single non-empty token.
	#[error("Scope `{scope}` must be non-empty and contain no whitespace.")]
	InvalidScope {
		/// Scope that was supplied.
		scope: String,
	},
}

/// Immutable provider descriptor consumed by the signer and the exchanger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Token endpoint receiving the client-credentials exchange.
	pub token_endpoint: Url,
	/// `aud` claim placed in client assertions.
	pub audience: String,
	/// Scope sent with every exchange.
	pub scope: String,
}
impl ProviderDescriptor {
	/// Creates a new builder seeded with Apple's audience and the Search Ads scope.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Descriptor for Apple's production identity provider.
	pub fn apple() -> Result<Self, ProviderDescriptorError> {
		let token = Url::parse(APPLE_TOKEN_ENDPOINT)
			.map_err(|_| ProviderDescriptorError::MissingTokenEndpoint)?;

		Self::builder().token_endpoint(token).build()
	}

	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint(&self.token_endpoint)?;

		if self.audience.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyAudience);
		}
		if self.scope.is_empty() || self.scope.chars().any(char::is_whitespace) {
			return Err(ProviderDescriptorError::InvalidScope { scope: self.scope.clone() });
		}

		Ok(())
	}
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Token endpoint used for exchanges.
	pub token_endpoint: Option<Url>,
	/// Assertion audience.
	pub audience: String,
	/// Requested scope.
	pub scope: String,
}
impl ProviderDescriptorBuilder {
	/// Creates a builder with Apple's audience and the Search Ads scope.
	pub fn new() -> Self {
		Self { token_endpoint: None, audience: APPLE_AUDIENCE.into(), scope: SEARCH_ADS_SCOPE.into() }
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the assertion audience.
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = audience.into();

		self
	}

	/// Overrides the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token_endpoint =
			self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let descriptor =
			ProviderDescriptor { token_endpoint, audience: self.audience, scope: self.scope };

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ProviderDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ProviderDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.map(|ip| ip.is_loopback())
			.unwrap_or(false),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn apple_defaults() {
		let descriptor = ProviderDescriptor::apple().expect("Apple descriptor should build.");

		assert_eq!(descriptor.token_endpoint.as_str(), APPLE_TOKEN_ENDPOINT);
		assert_eq!(descriptor.audience, "https://appleid.apple.com");
		assert_eq!(descriptor.scope, "searchadsorg");
	}

	#[test]
	fn insecure_endpoints_are_rejected_except_loopback() {
		let err = ProviderDescriptor::builder()
			.token_endpoint(url("http://example.com/token"))
			.build()
			.expect_err("Plain HTTP must be rejected.");

		assert_eq!(
			err,
			ProviderDescriptorError::InsecureEndpoint { url: "http://example.com/token".into() }
		);

		for loopback in ["http://127.0.0.1:8080/token", "http://localhost/token", "http://[::1]/t"]
		{
			ProviderDescriptor::builder()
				.token_endpoint(url(loopback))
				.build()
				.expect("Loopback HTTP should be accepted.");
		}
	}

	#[test]
	fn missing_endpoint_and_bad_scope_are_rejected() {
		assert_eq!(
			ProviderDescriptor::builder().build(),
			Err(ProviderDescriptorError::MissingTokenEndpoint)
		);
		assert!(matches!(
			ProviderDescriptor::builder()
				.token_endpoint(url("https://example.com/token"))
				.scope("a b")
				.build(),
			Err(ProviderDescriptorError::InvalidScope { .. })
		));
		assert_eq!(
			ProviderDescriptor::builder()
				.token_endpoint(url("https://example.com/token"))
				.audience(" ")
				.build(),
			Err(ProviderDescriptorError::EmptyAudience)
		);
	}
}
