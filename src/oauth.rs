//! Facade over the `oauth2` crate for the signed-assertion client-credentials exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId as OAuthClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientId, Clock, TokenSecret},
	error::{ConfigError, DecodeError, ExchangeError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ProviderDescriptor, ProviderErrorContext, ProviderErrorKind, ProviderStrategy},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		let _ = strategy;

		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => ExchangeError::Io(inner).into(),
			HttpClientError::Other(message) =>
				endpoint_failure(meta, format!("HTTP client error: {message}")),
			_ => endpoint_failure(meta, "unknown HTTP client error".into()),
		}
	}
}

/// One-shot exchange client built for the current assertion.
pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Configures `client_id`/`client_secret=<assertion>` as form-body credentials.
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &ClientId,
		assertion: &TokenSecret,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(descriptor.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let oauth_client = BasicClient::new(OAuthClientId::new(client_id.to_string()))
			.set_client_secret(ClientSecret::new(assertion.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Performs the `client_credentials` exchange, stamping the record with `clock` on receipt.
	pub(crate) fn exchange_client_credentials<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		scope: &'a str,
		extra_params: &'a [(String, String)],
		clock: &'a dyn Clock,
	) -> FacadeFuture<'a, AccessToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let mut request = self
				.oauth_client
				.exchange_client_credentials()
				.add_scope(Scope::new(scope.to_owned()));

			for (key, value) in extra_params {
				request = request.add_extra_param(key, value);
			}

			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error(strategy, meta.take(), err, self.error_mapper.as_ref())
			})?;

			map_token_response(response, clock.now())
		})
	}
}

fn map_token_response(
	response: BasicTokenResponse,
	received_at: OffsetDateTime,
) -> Result<AccessToken> {
	let secret = response.access_token().secret();

	if secret.is_empty() {
		return Err(DecodeError::EmptyAccessToken.into());
	}

	let expires_in = response.expires_in().ok_or(DecodeError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| DecodeError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(DecodeError::NonPositiveExpiresIn.into());
	}

	let expires_in = Duration::seconds(expires_in);

	received_at.checked_add(expires_in).ok_or(DecodeError::ExpiresInOutOfRange)?;

	let scope = response.scopes().map(|scopes| {
		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	});

	Ok(AccessToken::new(
		TokenSecret::new(secret.to_owned()),
		AsRef::<str>::as_ref(response.token_type()),
		scope,
		expires_in,
		received_at,
	))
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(strategy, meta_ref, error),
		RequestTokenError::Parse(error, body) => match meta_status(meta_ref) {
			// Non-2xx answers with an unparseable body are endpoint failures, not decode failures.
			Some(status) if !(200..300).contains(&status) => {
				let preview = String::from_utf8_lossy(&body).into_owned();
				let ctx =
					ProviderErrorContext::new().with_http_status(status).with_body_preview(preview);
				let message = format!("HTTP {status} with a non-OAuth error body");

				classified_error(strategy.classify_token_error(&ctx), message, meta_ref)
			},
			status => DecodeError::TokenResponse { source: error, status }.into(),
		},
		RequestTokenError::Other(message) => endpoint_failure(meta_ref, message),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx = ProviderErrorContext::new().with_oauth_error(response.error().as_ref());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let message = match response.error_description() {
		Some(description) => format!("{} ({description})", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	classified_error(strategy.classify_token_error(&ctx), message, meta)
}

fn classified_error(
	kind: ProviderErrorKind,
	reason: String,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let status = meta_status(meta);

	match kind {
		ProviderErrorKind::InvalidGrant => ExchangeError::InvalidGrant { reason, status }.into(),
		ProviderErrorKind::InvalidClient => ExchangeError::InvalidClient { reason, status }.into(),
		ProviderErrorKind::Transient => endpoint_failure(meta, reason),
	}
}

fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return endpoint_failure(meta, "request timed out".into());
	}

	ExchangeError::from(err).into()
}

fn endpoint_failure(meta: Option<&ResponseMetadata>, message: String) -> Error {
	ExchangeError::TokenEndpoint {
		message,
		status: meta_status(meta),
		retry_after: meta.and_then(|value| value.retry_after),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::{
		AccessToken as OAuthAccessToken, EmptyExtraTokenFields,
		basic::{BasicErrorResponseType, BasicTokenType},
	};
	use time::macros::datetime;
	// self
	use super::*;
	use crate::provider::DefaultProviderStrategy;

	type ReqwestRequestError = BasicRequestTokenError<HttpClientError<ReqwestError>>;

	fn token_response(secret: &str, expires_in: Option<u64>) -> BasicTokenResponse {
		let mut response = BasicTokenResponse::new(
			OAuthAccessToken::new(secret.into()),
			BasicTokenType::Bearer,
			EmptyExtraTokenFields {},
		);

		response.set_expires_in(expires_in.map(std::time::Duration::from_secs).as_ref());

		response
	}

	fn map(err: ReqwestRequestError, status: Option<u16>) -> Error {
		let meta = status.map(|status| ResponseMetadata { status: Some(status), retry_after: None });

		map_request_error(&DefaultProviderStrategy, meta, err, &ReqwestTransportErrorMapper)
	}

	fn parse_error() -> serde_path_to_error::Error<serde_json::Error> {
		let mut de = serde_json::Deserializer::from_str("{\"access_token\": 7}");

		serde_path_to_error::deserialize::<_, BasicTokenResponse>(&mut de)
			.expect_err("Numeric access_token must fail to parse.")
	}

	#[test]
	fn token_response_derives_expiry_from_receipt_time() {
		let received_at = datetime!(2025-01-01 00:00 UTC);
		let token = map_token_response(token_response("tok1", Some(3_600)), received_at)
			.expect("Valid response should map.");

		assert_eq!(token.secret.expose(), "tok1");
		assert_eq!(token.token_type, "bearer");
		assert_eq!(token.expires_at, datetime!(2025-01-01 01:00 UTC));
	}

	#[test]
	fn token_response_rejects_bad_lifetimes_and_empty_tokens() {
		let now = datetime!(2025-01-01 00:00 UTC);

		assert!(matches!(
			map_token_response(token_response("tok1", None), now),
			Err(Error::Decode(DecodeError::MissingExpiresIn))
		));
		assert!(matches!(
			map_token_response(token_response("tok1", Some(0)), now),
			Err(Error::Decode(DecodeError::NonPositiveExpiresIn))
		));
		assert!(matches!(
			map_token_response(token_response("tok1", Some(u64::MAX)), now),
			Err(Error::Decode(DecodeError::ExpiresInOutOfRange))
		));
		assert!(matches!(
			map_token_response(token_response("", Some(3_600)), now),
			Err(Error::Decode(DecodeError::EmptyAccessToken))
		));
	}

	#[test]
	fn server_errors_are_classified() {
		let err = map(
			RequestTokenError::ServerResponse(BasicErrorResponse::new(
				BasicErrorResponseType::InvalidClient,
				Some("assertion expired".into()),
				None,
			)),
			Some(401),
		);

		assert!(matches!(
			err,
			Error::Exchange(ExchangeError::InvalidClient { ref reason, status: Some(401) })
				if reason.contains("assertion expired")
		));

		let err = map(
			RequestTokenError::ServerResponse(BasicErrorResponse::new(
				BasicErrorResponseType::InvalidScope,
				None,
				None,
			)),
			Some(400),
		);

		assert!(matches!(err, Error::Exchange(ExchangeError::InvalidGrant { .. })));
	}

	#[test]
	fn parse_failures_depend_on_status() {
		let err = map(RequestTokenError::Parse(parse_error(), b"{}".to_vec()), Some(200));

		assert!(matches!(err, Error::Decode(DecodeError::TokenResponse { status: Some(200), .. })));

		let err = map(RequestTokenError::Parse(parse_error(), b"Bad Gateway".to_vec()), Some(502));

		assert!(matches!(
			err,
			Error::Exchange(ExchangeError::TokenEndpoint { status: Some(502), .. })
		));
	}

	#[test]
	fn other_errors_become_endpoint_failures() {
		let err = map(RequestTokenError::Other("unexpected content type".into()), Some(200));

		assert!(matches!(
			err,
			Error::Exchange(ExchangeError::TokenEndpoint { ref message, .. })
				if message == "unexpected content type"
		));
	}
}
