// crates.io
use httpmock::prelude::*;
// self
use oauth2_api_client::{
	Client, Error,
	config::{ClientAuthMethod, Config},
	error::TokenAcquisitionError,
};

const TOKEN_PATH: &str = "/oauth/token";
// base64("test-client:test-secret")
const BASIC_CREDENTIALS: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

fn build_client(api_address: &str, method: ClientAuthMethod) -> Client {
	// The mock server presents a self-signed certificate.
	let config = Config::builder(api_address, "test-client", "test-secret")
		.skip_ssl_validation(true)
		.client_auth(method)
		.build()
		.expect("Test configuration should be valid.");

	Client::new(config).expect("Test client should build.")
}

fn basic_client(api_address: &str) -> Client {
	build_client(api_address, ClientAuthMethod::ClientSecretBasic)
}

#[tokio::test]
async fn client_construction_performs_no_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"unused\",\"expires_in\":3600}");
		})
		.await;
	let _client = basic_client(&server.base_url());

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_is_exchanged_once_and_reused() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", BASIC_CREDENTIALS)
				.body_includes("grant_type=client_credentials")
				.body_includes("scope=");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc123\",\"expires_in\":3600}");
		})
		.await;
	let client = basic_client(&server.base_url());
	let first = client.get_token().await.expect("First token request should succeed.");
	let second = client.get_token().await.expect("Cached token request should succeed.");

	assert_eq!(first, "bearer abc123");
	assert_eq!(second, first);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_clones_share_one_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"shared\",\"expires_in\":3600}");
		})
		.await;
	let client = basic_client(&server.base_url());
	let clone = client.clone();
	let (first, second) = tokio::join!(client.get_token(), clone.get_token());

	assert_eq!(first.expect("First concurrent call should succeed."), "bearer shared");
	assert_eq!(second.expect("Second concurrent call should succeed."), "bearer shared");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_secret_post_sends_credentials_in_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("client_id=test-client")
				.body_includes("client_secret=test-secret");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"posted\",\"token_type\":\"bearer\"}");
		})
		.await;
	let client = build_client(&server.base_url(), ClientAuthMethod::ClientSecretPost);

	assert_eq!(
		client.get_token().await.expect("Token request should succeed."),
		"bearer posted"
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn rejected_exchange_surfaces_error_and_is_not_cached() {
	let server = MockServer::start_async().await;
	let mut rejection = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Bad credentials\"}");
		})
		.await;
	let client = basic_client(&server.base_url());
	let err = client.get_token().await.expect_err("Rejected exchange should fail.");

	match &err {
		Error::TokenAcquisition(TokenAcquisitionError::Rejected { error, status, .. }) => {
			assert_eq!(error, "invalid_client");
			assert_eq!(*status, Some(401));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let message = err.to_string();

	assert!(message.starts_with("Error getting bearer token"));
	assert!(message.contains("invalid_client"));
	assert!(message.contains("Bad credentials"));
	assert!(client.token_source().cached().await.is_none());

	rejection.assert_calls_async(1).await;
	rejection.delete_async().await;

	let success = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"recovered\",\"expires_in\":3600}");
		})
		.await;

	assert_eq!(
		client.get_token().await.expect("Next call should exchange again."),
		"bearer recovered"
	);

	success.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_token_response_is_reported() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body("{not json");
		})
		.await;
	let client = basic_client(&server.base_url());
	let err = client.get_token().await.expect_err("Malformed token response should fail.");

	assert!(matches!(
		err,
		Error::TokenAcquisition(TokenAcquisitionError::MalformedResponse {
			status: Some(200),
			..
		})
	));
	assert!(err.to_string().starts_with("Error getting bearer token"));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_token_endpoint_is_a_network_error() {
	let client = basic_client("http://127.0.0.1:1");
	let err = client.get_token().await.expect_err("Unreachable endpoint should fail.");

	assert!(matches!(err, Error::TokenAcquisition(TokenAcquisitionError::Network { .. })));
}

#[tokio::test]
async fn invalidated_token_is_exchanged_again() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc123\",\"expires_in\":3600}");
		})
		.await;
	let client = basic_client(&server.base_url());

	client.get_token().await.expect("First token request should succeed.");
	client.token_source().invalidate().await;
	client.get_token().await.expect("Token request after invalidation should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn short_lived_token_is_refreshed_within_skew() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"brief\",\"expires_in\":5}");
		})
		.await;
	let client = basic_client(&server.base_url());

	client.get_token().await.expect("First token request should succeed.");
	client.get_token().await.expect("Refresh request should succeed.");

	mock.assert_calls_async(2).await;
}
