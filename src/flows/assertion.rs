//! Client assertion signing with a re-verified single-entry cache.
//!
//! [`AssertionSigner::token`] serves the cached assertion only while it still verifies
//! against the stored key, audience, and issuer and its `exp` lies in the future. Anything
//! else (absent, expired, tampered, signed by a different key) is a silent cache miss
//! that triggers a fresh signature. The cache lock is held across check-sign-store, so
//! concurrent callers never sign twice for the same miss.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use jsonwebtoken::{Algorithm, Header, Validation};
// self
use crate::{
	_prelude::*,
	auth::{Clock, Credentials, SystemClock, TokenSecret},
	error::{ConfigError, SigningError},
	flows::ArtifactState,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::APPLE_AUDIENCE,
};

/// Longest assertion lifetime accepted by the identity provider.
pub const MAX_ASSERTION_LIFETIME: Duration = Duration::days(180);
/// Lifetime used unless overridden with [`AssertionSigner::with_lifetime`].
pub const DEFAULT_ASSERTION_LIFETIME: Duration = MAX_ASSERTION_LIFETIME;

/// Claims carried by a client assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Audience (the identity provider).
	pub aud: String,
	/// Subject (the client identifier).
	pub sub: String,
	/// Issuer (the team identifier).
	pub iss: String,
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
}

/// A signed assertion and the instants decoded from its claims.
#[derive(Clone, Debug)]
pub struct SignedAssertion {
	/// Compact JWS; callers must avoid logging it.
	pub token: TokenSecret,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Expiry instant.
	pub expires_at: OffsetDateTime,
}

/// Thread-safe counters for assertion signing.
#[derive(Debug, Default)]
pub struct SignerMetrics {
	signatures: AtomicU64,
	cache_hits: AtomicU64,
	failures: AtomicU64,
}
impl SignerMetrics {
	/// Returns the number of assertions signed.
	pub fn signatures(&self) -> u64 {
		self.signatures.load(Ordering::Relaxed)
	}

	/// Returns the number of calls served from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of failed signing attempts.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	fn record_signature(&self) {
		self.signatures.fetch_add(1, Ordering::Relaxed);
	}

	fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

/// Builds, signs, and caches ES256 client assertions.
pub struct AssertionSigner {
	credentials: Credentials,
	audience: String,
	lifetime: Duration,
	clock: Arc<dyn Clock>,
	cache: Mutex<Option<SignedAssertion>>,
	metrics: Arc<SignerMetrics>,
}
impl AssertionSigner {
	/// Creates a signer for `credentials` with Apple's audience and the default lifetime.
	pub fn new(credentials: Credentials) -> Self {
		Self {
			credentials,
			audience: APPLE_AUDIENCE.into(),
			lifetime: DEFAULT_ASSERTION_LIFETIME,
			clock: Arc::new(SystemClock),
			cache: Mutex::new(None),
			metrics: Default::default(),
		}
	}

	/// Overrides the assertion lifetime; it must be positive and at most 180 days.
	pub fn with_lifetime(mut self, lifetime: Duration) -> Result<Self, ConfigError> {
		if !lifetime.is_positive() || lifetime > MAX_ASSERTION_LIFETIME {
			return Err(ConfigError::AssertionLifetimeOutOfRange {
				max_days: MAX_ASSERTION_LIFETIME.whole_days(),
			});
		}

		self.lifetime = lifetime;

		Ok(self)
	}

	/// Overrides the `aud` claim.
	pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = audience.into();

		self
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Credential material used for signing.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Configured assertion lifetime.
	pub fn lifetime(&self) -> Duration {
		self.lifetime
	}

	/// Shared signing counters.
	pub fn metrics(&self) -> &SignerMetrics {
		&self.metrics
	}

	/// Returns a valid signed assertion, signing a new one on cache miss.
	pub fn token(&self) -> Result<TokenSecret> {
		self.assertion().map(|assertion| assertion.token)
	}

	/// Like [`token`](Self::token) but also returns the decoded instants.
	pub fn assertion(&self) -> Result<SignedAssertion> {
		const KIND: FlowKind = FlowKind::Assertion;

		let _span = FlowSpan::new(KIND, "token").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let mut cache = self.cache.lock();
		let now = self.clock.now();

		if let Some(current) = cache.as_ref().filter(|cached| self.verify(&cached.token, now).is_some())
		{
			self.metrics.record_cache_hit();
			obs::record_flow_outcome(KIND, FlowOutcome::CacheHit);

			return Ok(current.clone());
		}

		match self.sign(now) {
			Ok(fresh) => {
				*cache = Some(fresh.clone());

				self.metrics.record_signature();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				Ok(fresh)
			},
			Err(e) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				Err(e)
			},
		}
	}

	/// Returns `true` if a cached assertion exists and still re-verifies right now.
	pub fn is_token_valid(&self) -> bool {
		self.state().is_valid()
	}

	/// Reports the cache state without signing.
	pub fn state(&self) -> ArtifactState {
		let cache = self.cache.lock();

		match cache.as_ref() {
			None => ArtifactState::Absent,
			Some(cached) if self.verify(&cached.token, self.clock.now()).is_some() =>
				ArtifactState::Valid,
			Some(_) => ArtifactState::Expired,
		}
	}

	/// Drops the cached assertion; the next call signs a new one.
	pub fn invalidate(&self) {
		*self.cache.lock() = None;
	}

	/// Verifies `token` against the stored key, audience, and issuer, and checks that
	/// `now` is before its expiry. Returns the claims on success.
	pub fn verify(&self, token: &TokenSecret, now: OffsetDateTime) -> Option<AssertionClaims> {
		if token.is_empty() {
			return None;
		}

		let mut validation = Validation::new(Algorithm::ES256);

		validation.set_audience(&[&self.audience]);
		validation.set_issuer(&[self.credentials.team_id.as_ref()]);
		// Expiry is checked against the injected clock below.
		validation.validate_exp = false;

		let data = jsonwebtoken::decode::<AssertionClaims>(
			token.expose(),
			self.credentials.decoding_key(),
			&validation,
		)
		.ok()?;

		if data.claims.sub != self.credentials.client_id.as_ref()
			|| data.header.kid.as_deref() != Some(self.credentials.key_id.as_ref())
			|| now.unix_timestamp() >= data.claims.exp
		{
			return None;
		}

		Some(data.claims)
	}

	fn sign(&self, now: OffsetDateTime) -> Result<SignedAssertion> {
		let issued_at = now.replace_nanosecond(0).unwrap_or(now);
		let expires_at = issued_at + self.lifetime;
		let claims = AssertionClaims {
			aud: self.audience.clone(),
			sub: self.credentials.client_id.to_string(),
			iss: self.credentials.team_id.to_string(),
			iat: issued_at.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let mut header = Header::new(Algorithm::ES256);

		header.kid = Some(self.credentials.key_id.to_string());

		let token = jsonwebtoken::encode(&header, &claims, self.credentials.encoding_key())
			.map_err(SigningError::from)?;

		Ok(SignedAssertion { token: TokenSecret::new(token), issued_at, expires_at })
	}
}
impl Debug for AssertionSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssertionSigner")
			.field("credentials", &self.credentials)
			.field("audience", &self.audience)
			.field("lifetime", &self.lifetime)
			.field("cached", &self.cache.lock().is_some())
			.finish()
	}
}
