//! Authenticated request plumbing shared by every resource service.
//!
//! Each request asks the [`TokenSource`] for a bearer token right before dispatch and binds
//! it, together with the organization context, to that request only. Nothing
//! authentication-related is stored on the underlying reqwest client, so a refreshed token
//! or a changed organization takes effect on the next call.

// crates.io
use reqwest::{
	Method, Proxy, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{
		AclService, AdGroupService, ApiResponse, AppService, CampaignService, ErrorResponseBody,
		ErrorResponseItem, GeoService, KeywordService, NegativeKeywordService, QueryParams,
		ReportingService,
	},
	error::{ApiError, ConfigError, DecodeError, TransportError},
	flows::TokenSource,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.searchads.apple.com/api/v5/";
/// `User-Agent` sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("search-ads-rs/", env!("CARGO_PKG_VERSION"));
/// Per-request timeout applied unless overridden.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

const ORG_CONTEXT: &str = "X-AP-Context";

/// Typed client for the Search Ads REST API.
///
/// Cloning is cheap; clones share the token source, the connection pool, and the
/// organization context.
#[derive(Clone)]
pub struct SearchAdsClient {
	inner: Arc<ClientInner>,
}
impl SearchAdsClient {
	/// Starts configuring a client.
	pub fn builder() -> SearchAdsClientBuilder {
		SearchAdsClientBuilder::default()
	}

	/// Builds a client with default settings around `token_source`.
	pub fn new(token_source: impl 'static + TokenSource) -> Result<Self> {
		Self::builder().build(token_source)
	}

	/// API root that relative resource paths are joined onto.
	pub fn base_url(&self) -> &Url {
		&self.inner.base_url
	}

	/// Token source consulted before every request.
	pub fn token_source(&self) -> &Arc<dyn TokenSource> {
		&self.inner.token_source
	}

	/// Organization the client currently acts for, if any.
	pub fn org_id(&self) -> Option<i64> {
		*self.inner.org_id.read()
	}

	/// Acts for `org_id` on subsequent requests.
	pub fn set_org_id(&self, org_id: i64) {
		*self.inner.org_id.write() = Some(org_id);
	}

	/// Stops sending an organization context.
	pub fn clear_org_id(&self) {
		*self.inner.org_id.write() = None;
	}

	/// Access-control endpoints.
	pub fn acls(&self) -> AclService<'_> {
		AclService::new(self)
	}

	/// Campaign endpoints.
	pub fn campaigns(&self) -> CampaignService<'_> {
		CampaignService::new(self)
	}

	/// Ad group endpoints.
	pub fn adgroups(&self) -> AdGroupService<'_> {
		AdGroupService::new(self)
	}

	/// Targeting keyword endpoints.
	pub fn keywords(&self) -> KeywordService<'_> {
		KeywordService::new(self)
	}

	/// Negative keyword endpoints at campaign and ad group level.
	pub fn negative_keywords(&self) -> NegativeKeywordService<'_> {
		NegativeKeywordService::new(self)
	}

	/// Reporting endpoints.
	pub fn reports(&self) -> ReportingService<'_> {
		ReportingService::new(self)
	}

	/// Geographic search endpoints.
	pub fn geo(&self) -> GeoService<'_> {
		GeoService::new(self)
	}

	/// App search endpoints.
	pub fn apps(&self) -> AppService<'_> {
		AppService::new(self)
	}

	pub(crate) async fn get<T>(
		&self,
		path: &str,
		query: &(dyn QueryParams + Sync),
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		self.execute(Method::GET, path, query.to_query(), None).await
	}

	pub(crate) async fn post<T, B>(
		&self,
		path: &str,
		query: &(dyn QueryParams + Sync),
		body: &B,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize + Sync,
	{
		let body = encode_body(body)?;

		self.execute(Method::POST, path, query.to_query(), Some(body)).await
	}

	pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize + Sync,
	{
		let body = encode_body(body)?;

		self.execute(Method::PUT, path, Vec::new(), Some(body)).await
	}

	pub(crate) async fn delete(&self, path: &str) -> Result<()> {
		self.execute::<serde_json::Value>(Method::DELETE, path, Vec::new(), None)
			.await
			.map(|_| ())
	}

	async fn execute<T>(
		&self,
		method: Method,
		path: &str,
		query: Vec<(&'static str, String)>,
		body: Option<Vec<u8>>,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		const KIND: FlowKind = FlowKind::ApiCall;

		let span = FlowSpan::request(method.as_str(), path);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.dispatch(&span, method, path, query, body)).await;

		obs::record_flow_outcome(
			KIND,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}

	async fn dispatch<T>(
		&self,
		span: &FlowSpan,
		method: Method,
		path: &str,
		query: Vec<(&'static str, String)>,
		body: Option<Vec<u8>>,
	) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.inner.endpoint(path)?;
		let token = self.inner.token_source.access_token().await?;
		let mut authorization = HeaderValue::try_from(format!("Bearer {}", token.expose()))
			.map_err(|_| ConfigError::InvalidHeader { name: "Authorization" })?;

		authorization.set_sensitive(true);

		let mut request = self
			.inner
			.http
			.request(method, url)
			.header(AUTHORIZATION, authorization)
			.header(ACCEPT, "application/json");

		if !query.is_empty() {
			request = request.query(&query);
		}
		if let Some(org_id) = self.org_id() {
			request = request.header(ORG_CONTEXT, format!("orgId={org_id}"));
		}
		if let Some(body) = body {
			request = request.header(CONTENT_TYPE, "application/json").body(body);
		}

		let response = request.send().await.map_err(TransportError::from)?;
		let status = response.status();

		span.record_status(status.as_u16());
		obs::record_api_status(status.as_u16());

		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if status == StatusCode::UNAUTHORIZED {
			self.inner.token_source.invalidate().await;
		}
		if !status.is_success() {
			return Err(ApiError::Status { status: status.as_u16(), errors: error_items(&bytes) }
				.into());
		}

		decode_envelope(status.as_u16(), &bytes)
	}
}
impl Debug for SearchAdsClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SearchAdsClient")
			.field("base_url", &self.inner.base_url.as_str())
			.field("org_id", &self.org_id())
			.finish()
	}
}

/// Builder for [`SearchAdsClient`].
#[derive(Clone, Debug)]
pub struct SearchAdsClientBuilder {
	base_url: String,
	timeout: std::time::Duration,
	user_agent: String,
	org_id: Option<i64>,
	proxy: Option<String>,
	http_client: Option<ReqwestClient>,
}
impl SearchAdsClientBuilder {
	/// Overrides the API root; a trailing `/` is added when missing.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();

		self
	}

	/// Overrides the per-request timeout.
	pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Sets the initial organization context.
	pub fn org_id(mut self, org_id: i64) -> Self {
		self.org_id = Some(org_id);

		self
	}

	/// Routes every request through `proxy_url`.
	pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
		self.proxy = Some(proxy_url.into());

		self
	}

	/// Reuses a preconfigured reqwest client; timeout, user agent, and proxy settings are
	/// then ignored.
	pub fn http_client(mut self, client: ReqwestClient) -> Self {
		self.http_client = Some(client);

		self
	}

	/// Builds the client around `token_source`.
	pub fn build(self, token_source: impl 'static + TokenSource) -> Result<SearchAdsClient> {
		let mut base_url = self.base_url;

		if !base_url.ends_with('/') {
			base_url.push('/');
		}

		let base_url =
			Url::parse(&base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let http = match self.http_client {
			Some(client) => client,
			None => {
				let mut builder =
					ReqwestClient::builder().timeout(self.timeout).user_agent(self.user_agent);

				if let Some(proxy) = self.proxy {
					builder = builder.proxy(Proxy::all(proxy).map_err(ConfigError::from)?);
				}

				builder.build().map_err(ConfigError::from)?
			},
		};

		Ok(SearchAdsClient {
			inner: Arc::new(ClientInner {
				http,
				base_url,
				token_source: Arc::new(token_source),
				org_id: RwLock::new(self.org_id),
			}),
		})
	}
}
impl Default for SearchAdsClientBuilder {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			timeout: DEFAULT_TIMEOUT,
			user_agent: DEFAULT_USER_AGENT.into(),
			org_id: None,
			proxy: None,
			http_client: None,
		}
	}
}

struct ClientInner {
	http: ReqwestClient,
	base_url: Url,
	token_source: Arc<dyn TokenSource>,
	org_id: RwLock<Option<i64>>,
}
impl ClientInner {
	fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidApiPath { path: path.to_owned(), source })
	}
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: Option<ErrorResponseBody>,
}

fn encode_body<B>(body: &B) -> Result<Vec<u8>>
where
	B: ?Sized + Serialize,
{
	Ok(serde_json::to_vec(body).map_err(DecodeError::RequestBody)?)
}

fn error_items(body: &[u8]) -> Vec<ErrorResponseItem> {
	serde_json::from_slice::<ErrorEnvelope>(body)
		.ok()
		.and_then(|envelope| envelope.error)
		.map(|error| error.errors)
		.unwrap_or_default()
}

fn decode_envelope<T>(status: u16, body: &[u8]) -> Result<ApiResponse<T>>
where
	T: DeserializeOwned,
{
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(ApiResponse::empty());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let envelope: ApiResponse<T> = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::ApiResponse { source, status })?;

	if let Some(error) = envelope.error.as_ref().filter(|error| !error.errors.is_empty()) {
		return Err(ApiError::Rejected { errors: error.errors.clone() }.into());
	}

	Ok(envelope)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{api::PageDetail, flows::StaticTokenSource};

	#[test]
	fn envelope_with_error_items_is_rejected() {
		let body = br#"{"data":null,"error":{"errors":[{"field":"name","message":"taken"}]}}"#;
		let err = decode_envelope::<serde_json::Value>(200, body)
			.expect_err("Embedded errors should be rejected.");

		assert!(matches!(
			err,
			Error::Api(ApiError::Rejected { ref errors }) if errors[0].message.as_deref() == Some("taken")
		));
	}

	#[test]
	fn envelope_decodes_data_and_pagination() {
		let body = br#"{"data":[1,2],"pagination":{"totalResults":2,"startIndex":0,"itemsPerPage":2}}"#;
		let envelope =
			decode_envelope::<Vec<u32>>(200, body).expect("Well-formed envelope should decode.");

		assert_eq!(envelope.data, Some(vec![1, 2]));
		assert_eq!(
			envelope.pagination,
			Some(PageDetail { total_results: 2, start_index: 0, items_per_page: 2 })
		);
		assert!(
			decode_envelope::<Vec<u32>>(200, b"  ").expect("Empty body is allowed.").data.is_none()
		);
	}

	#[test]
	fn decode_failure_names_the_field() {
		let err = decode_envelope::<Vec<u32>>(200, br#"{"data":[1,"two"]}"#)
			.expect_err("Mismatched payload should fail.");

		match err {
			Error::Decode(DecodeError::ApiResponse { source, status }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "data[1]");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn error_items_tolerate_non_json_bodies() {
		assert!(error_items(b"<html>bad gateway</html>").is_empty());
		assert_eq!(
			error_items(br#"{"error":{"errors":[{"messageCode":"UNAUTHORIZED"}]}}"#).len(),
			1
		);
	}

	#[test]
	fn builder_normalizes_base_url_and_org_context() {
		let client = SearchAdsClient::builder()
			.base_url("https://api.example.test/api/v5")
			.org_id(7)
			.build(StaticTokenSource::new("token"))
			.expect("Client should build.");

		assert_eq!(client.base_url().as_str(), "https://api.example.test/api/v5/");
		assert_eq!(client.org_id(), Some(7));

		client.clear_org_id();

		assert_eq!(client.org_id(), None);

		client.set_org_id(9);

		assert_eq!(client.clone().org_id(), Some(9));
	}

	#[test]
	fn invalid_base_url_is_a_config_error() {
		let err = SearchAdsClient::builder()
			.base_url("not a url")
			.build(StaticTokenSource::new("token"))
			.expect_err("Invalid base URL should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));
	}
}
