//! Client-credentials exchange with a single-flight access-token cache.
//!
//! [`TokenExchanger::access_token`] returns the cached token while the clock is strictly
//! before its expiry. On a miss it asks the [`AssertionSigner`] for a valid assertion,
//! posts it to the token endpoint, and caches the result. The async cache lock is held
//! across the whole check-exchange-store sequence, so concurrent callers that observe the
//! same miss wait for the single in-flight exchange and then read its result.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Clock, SystemClock, TokenSecret},
	flows::{ArtifactState, AssertionSigner, BoxFuture, TokenSource},
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{BasicFacade, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
};

/// Exchanger specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenExchanger = TokenExchanger<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Thread-safe counters for token exchanges.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	exchanges: AtomicU64,
	cache_hits: AtomicU64,
	failures: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the number of network exchanges attempted.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of calls served from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of failed exchanges.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

/// Obtains and caches bearer tokens by exchanging signed assertions.
pub struct TokenExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	signer: AssertionSigner,
	descriptor: ProviderDescriptor,
	strategy: Arc<dyn ProviderStrategy>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	clock: Arc<dyn Clock>,
	cache: AsyncMutex<Option<AccessToken>>,
	metrics: Arc<ExchangeMetrics>,
}
impl<C, M> TokenExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an exchanger that reuses the caller-provided transport + mapper pair.
	///
	/// The signer's `aud` claim is taken from `descriptor`.
	pub fn with_http_client(
		signer: AssertionSigner,
		descriptor: ProviderDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			signer: signer.with_audience(descriptor.audience.clone()),
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			clock: Arc::new(SystemClock),
			cache: AsyncMutex::new(None),
			metrics: Default::default(),
		}
	}

	/// Replaces the error-classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the time source used to stamp and expire access tokens.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// The signer feeding assertions into exchanges.
	pub fn signer(&self) -> &AssertionSigner {
		&self.signer
	}

	/// Provider descriptor in use.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Shared exchange counters.
	pub fn metrics(&self) -> &ExchangeMetrics {
		&self.metrics
	}

	/// Returns a bearer token valid right now, exchanging a fresh assertion on cache miss.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.access_token_record().await.map(|record| record.secret)
	}

	/// Like [`access_token`](Self::access_token) but returns the whole record.
	pub async fn access_token_record(&self) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::TokenExchange;

		let span = FlowSpan::new(KIND, "access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut cache = self.cache.lock().await;

				if let Some(current) =
					cache.as_ref().filter(|token| token.is_valid_at(self.clock.now()))
				{
					self.metrics.record_cache_hit();
					obs::record_flow_outcome(KIND, FlowOutcome::CacheHit);

					return Ok(current.clone());
				}

				self.metrics.record_exchange();

				let fresh = self.exchange().await?;

				*cache = Some(fresh.clone());

				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				Ok(fresh)
			})
			.await;

		if result.is_err() {
			self.metrics.record_failure();
			obs::record_flow_outcome(KIND, FlowOutcome::Failure);
		}

		result
	}

	/// Reports the cache state without exchanging.
	pub async fn state(&self) -> ArtifactState {
		match self.cache.lock().await.as_ref() {
			None => ArtifactState::Absent,
			Some(token) if token.is_valid_at(self.clock.now()) => ArtifactState::Valid,
			Some(_) => ArtifactState::Expired,
		}
	}

	/// Drops the cached access token; the next call performs a fresh exchange.
	///
	/// Waits for any in-flight exchange so its result cannot repopulate the cache after
	/// the invalidation.
	pub async fn invalidate(&self) {
		*self.cache.lock().await = None;
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let assertion = self.signer.token()?;
		let mut form = BTreeMap::new();

		self.strategy.augment_token_request(&mut form);

		let extra_params = form
			.into_iter()
			.filter(|(key, _)| {
				!matches!(key.as_str(), "grant_type" | "scope" | "client_id" | "client_secret")
			})
			.collect::<Vec<(String, String)>>();
		let facade: BasicFacade<C, M> = BasicFacade::from_descriptor(
			&self.descriptor,
			&self.signer.credentials().client_id,
			&assertion,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;

		facade
			.exchange_client_credentials(
				self.strategy.as_ref(),
				&self.descriptor.scope,
				extra_params.as_slice(),
				self.clock.as_ref(),
			)
			.await
	}
}
impl TokenExchanger<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an exchanger with its own reqwest transport (redirects disabled, 30 s timeout).
	pub fn new(signer: AssertionSigner, descriptor: ProviderDescriptor) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(30))?;

		Ok(Self::with_http_client(
			signer,
			descriptor,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> TokenSource for TokenExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn access_token(&self) -> BoxFuture<'_, Result<TokenSecret>> {
		Box::pin(TokenExchanger::access_token(self))
	}

	fn invalidate(&self) -> BoxFuture<'_, ()> {
		Box::pin(TokenExchanger::invalidate(self))
	}
}
impl<C, M> Debug for TokenExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchanger")
			.field("signer", &self.signer)
			.field("descriptor", &self.descriptor)
			.finish()
	}
}
