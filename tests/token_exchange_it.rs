// crates.io
use httpmock::prelude::*;
// self
use search_ads::{
	_preludet::*,
	auth::{ManualClock, TokenSecret},
	error::{DecodeError, Error, ExchangeError},
	flows::{ArtifactState, TokenExchanger},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{ProviderDescriptor, ProviderStrategy},
	url::form_urlencoded,
};

const TOKEN_BODY: &str =
	"{\"access_token\":\"bearer-1\",\"token_type\":\"Bearer\",\"expires_in\":3600}";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder()
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse."),
		)
		.build()
		.expect("Loopback descriptor should build.")
}

fn epoch() -> OffsetDateTime {
	OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("Fixed instant should be valid.")
}

#[tokio::test]
async fn cached_token_is_reused_until_expiry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);
	let first = exchanger.access_token().await.expect("Initial exchange should succeed.");

	clock.advance(Duration::seconds(3599));

	let second = exchanger.access_token().await.expect("Cached token should be served.");

	assert_eq!(first.expose(), "bearer-1");
	assert_eq!(second.expose(), "bearer-1");
	assert_eq!(exchanger.metrics().exchanges(), 1);
	assert_eq!(exchanger.metrics().cache_hits(), 1);

	mock.assert_calls_async(1).await;

	clock.advance(Duration::seconds(2));

	assert_eq!(exchanger.state().await, ArtifactState::Expired);

	exchanger.access_token().await.expect("Expired token should be replaced.");

	mock.assert_calls_async(2).await;
}

#[test]
fn descriptor_audience_is_signed_into_assertions() {
	let descriptor = ProviderDescriptor::builder()
		.token_endpoint(Url::parse("http://127.0.0.1:1/token").expect("Token URL should parse."))
		.audience("https://idp.example.com")
		.build()
		.expect("Descriptor with a custom audience should build.");
	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(descriptor, &clock);
	let assertion = exchanger.signer().token().expect("Assertion should be signed.");
	let claims = exchanger
		.signer()
		.verify(&assertion, epoch())
		.expect("Assertion should verify for the descriptor audience.");

	assert_eq!(claims.aud, "https://idp.example.com");
	assert_eq!(claims.aud, exchanger.descriptor().audience);
}

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(TOKEN_BODY)
				.delay(std::time::Duration::from_millis(100));
		})
		.await;
	let clock = ManualClock::new(epoch());
	let exchanger = Arc::new(build_reqwest_test_exchanger(build_descriptor(&server), &clock));
	let handles = (0..8)
		.map(|_| {
			let exchanger = exchanger.clone();

			tokio::spawn(async move { exchanger.access_token().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let token = handle
			.await
			.expect("Exchange task should not panic.")
			.expect("Concurrent exchange should succeed.");

		assert_eq!(token.expose(), "bearer-1");
	}

	mock.assert_calls_async(1).await;
	assert_eq!(exchanger.metrics().exchanges(), 1);
}

#[tokio::test]
async fn invalidate_forces_a_new_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);

	exchanger.access_token().await.expect("Initial exchange should succeed.");
	exchanger.invalidate().await;

	assert_eq!(exchanger.state().await, ArtifactState::Absent);

	exchanger.access_token().await.expect("Exchange after invalidation should succeed.");

	mock.assert_calls_async(2).await;
	// The assertion itself is still valid and is reused.
	assert_eq!(exchanger.signer().metrics().signatures(), 1);
}

#[tokio::test]
async fn invalid_client_is_classified() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);
	let err = exchanger.access_token().await.expect_err("Rejected client should fail.");

	match err {
		Error::Exchange(ExchangeError::InvalidClient { status, .. }) => {
			assert_eq!(status, Some(401));
		},
		other => panic!("Expected invalid client error, got {other:?}."),
	}

	mock.assert_calls_async(1).await;
	assert_eq!(exchanger.metrics().failures(), 1);
	assert_eq!(exchanger.state().await, ArtifactState::Absent);
}

#[tokio::test]
async fn invalid_grant_is_classified() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"expired assertion\"}");
		})
		.await;

	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);
	let err = exchanger.access_token().await.expect_err("Rejected grant should fail.");

	match err {
		Error::Exchange(ExchangeError::InvalidGrant { reason, status }) => {
			assert!(reason.contains("expired assertion"));
			assert_eq!(status, Some(400));
		},
		other => panic!("Expected invalid grant error, got {other:?}."),
	}
}

#[tokio::test]
async fn non_json_server_error_is_an_endpoint_failure() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503).header("content-type", "text/plain").body("upstream unavailable");
		})
		.await;

	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);
	let err = exchanger.access_token().await.expect_err("Unavailable endpoint should fail.");

	match err {
		Error::Exchange(ExchangeError::TokenEndpoint { status, .. }) => {
			assert_eq!(status, Some(503));
		},
		other => panic!("Expected token endpoint error, got {other:?}."),
	}
}

#[tokio::test]
async fn missing_expires_in_is_a_decode_failure() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"bearer-1\",\"token_type\":\"Bearer\"}");
		})
		.await;

	let clock = ManualClock::new(epoch());
	let exchanger = build_reqwest_test_exchanger(build_descriptor(&server), &clock);
	let err = exchanger.access_token().await.expect_err("Token without lifetime should fail.");

	assert!(matches!(err, Error::Decode(DecodeError::MissingExpiresIn)));
}

#[derive(Debug)]
struct FakeTransportError;
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Fake transport failed.")
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Default)]
struct RecordingHttpClient {
	forms: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
}
impl RecordingHttpClient {
	fn recorded(&self) -> Vec<BTreeMap<String, String>> {
		self.forms.lock().clone()
	}
}
impl TokenHttpClient for RecordingHttpClient {
	type Handle = RecordingHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		RecordingHandle { slot, forms: self.forms.clone() }
	}
}

struct RecordingHandle {
	slot: ResponseMetadataSlot,
	forms: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
}
impl<'a> AsyncHttpClient<'a> for RecordingHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let form = form_urlencoded::parse(request.body())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect::<BTreeMap<_, _>>();

		self.forms.lock().push(form);

		Box::pin(async move {
			slot.take();
			slot.store(ResponseMetadata { status: Some(200), retry_after: None });

			let mut response = HttpResponse::new(TOKEN_BODY.as_bytes().to_vec());

			response.headers_mut().insert(
				"content-type",
				"application/json".parse().expect("Header value should parse."),
			);

			Ok(response)
		})
	}
}

struct FakeMapper;
impl TransportErrorMapper<FakeTransportError> for FakeMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn ProviderStrategy,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<FakeTransportError>,
	) -> Error {
		ExchangeError::TokenEndpoint {
			message: format!("Fake transport: {error}"),
			status: None,
			retry_after: None,
		}
		.into()
	}
}

#[tokio::test]
async fn exchange_posts_assertion_as_client_secret() {
	let clock = ManualClock::new(epoch());
	let signer = test_signer(&clock);
	let http_client = RecordingHttpClient::default();
	let descriptor = ProviderDescriptor::apple().expect("Apple descriptor should build.");
	let exchanger = TokenExchanger::<RecordingHttpClient, FakeMapper>::with_http_client(
		signer,
		descriptor,
		http_client.clone(),
		Arc::new(FakeMapper),
	)
	.with_clock(Arc::new(clock.clone()));
	let record = exchanger.access_token_record().await.expect("Fake exchange should succeed.");

	assert_eq!(record.secret.expose(), "bearer-1");
	assert_eq!(record.expires_at, epoch() + Duration::seconds(3600));

	let forms = http_client.recorded();

	assert_eq!(forms.len(), 1);

	let form = &forms[0];

	assert_eq!(form.get("grant_type").map(String::as_str), Some("client_credentials"));
	assert_eq!(form.get("client_id").map(String::as_str), Some("app1"));
	assert_eq!(form.get("scope").map(String::as_str), Some("searchadsorg"));

	let assertion = TokenSecret::new(
		form.get("client_secret").cloned().expect("Assertion should be posted as client_secret."),
	);
	let claims = exchanger
		.signer()
		.verify(&assertion, epoch())
		.expect("Posted assertion should verify against the signing key.");

	assert_eq!(claims.sub, "app1");
	assert_eq!(claims.iss, "team1");
}
