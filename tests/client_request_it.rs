// std
use std::collections::HashMap;
// crates.io
use httpmock::prelude::*;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
// self
use oauth2_api_client::{
	Client, Config, Error,
	error::{DecodeError, TransportError},
};

fn build_client(server: &MockServer) -> Client {
	// The mock server presents a self-signed certificate.
	let config = Config::builder(server.base_url(), "test-client", "test-secret")
		.skip_ssl_validation(true)
		.build()
		.expect("Test configuration should be valid.");

	Client::new(config).expect("Test client should build.")
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc123\",\"expires_in\":3600}");
		})
		.await
}

#[derive(Debug, Deserialize)]
struct User {
	id: String,
	#[serde(rename = "userName")]
	user_name: String,
}

#[tokio::test]
async fn get_request_carries_bearer_token() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server).await;
	let users = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/Users")
				.header("authorization", "bearer abc123")
				.header("accept", "application/json");
			then.status(200).header("content-type", "application/json").body("{\"resources\":[]}");
		})
		.await;
	let client = build_client(&server);

	assert_eq!(client.get_token().await.expect("Token request should succeed."), "bearer abc123");

	let descriptor =
		client.new_request(Method::GET, "/Users").header("Accept", "application/json");
	let response = client.execute(descriptor).await.expect("API request should succeed.");

	assert_eq!(response.status(), 200);

	users.assert_async().await;
	token.assert_calls_async(1).await;
}

#[tokio::test]
async fn caller_authorization_header_is_replaced() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let info = server
		.mock_async(|when, then| {
			when.method(GET).path("/info").header("authorization", "bearer abc123");
			then.status(200).body("{}");
		})
		.await;
	let client = build_client(&server);
	let descriptor =
		client.new_request(Method::GET, "/info").header("Authorization", "bearer forged");

	client.execute(descriptor).await.expect("API request should succeed.");

	info.assert_async().await;
}

#[tokio::test]
async fn json_body_and_query_parameters_are_sent() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/Users")
				.query_param("attributes", "id")
				.header("content-type", "application/json")
				.json_body(json!({ "userName": "marissa" }));
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"u-1\",\"userName\":\"marissa\"}");
		})
		.await;
	let client = build_client(&server);
	let descriptor = client
		.new_request(Method::POST, "/Users")
		.query("attributes", "id")
		.header("Content-Type", "application/json")
		.json(json!({ "userName": "marissa" }));
	let user: User =
		client.execute_json(descriptor).await.expect("Create request should decode.");

	assert_eq!(user.id, "u-1");
	assert_eq!(user.user_name, "marissa");

	create.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/Users/unknown");
			then.status(404).body("{\"error\":\"scim_resource_not_found\"}");
		})
		.await;
	let client = build_client(&server);
	let response = client
		.execute(client.new_request(Method::GET, "/Users/unknown"))
		.await
		.expect("A 404 response should not be an error.");

	assert_eq!(response.status(), 404);

	let body: HashMap<String, String> =
		oauth2_api_client::decode_json(response).await.expect("Error body should decode.");

	assert_eq!(body.get("error").map(String::as_str), Some("scim_resource_not_found"));

	missing.assert_async().await;
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let _info = server
		.mock_async(|when, then| {
			when.method(GET).path("/info");
			then.status(200).body("<html>not json</html>");
		})
		.await;
	let client = build_client(&server);
	let err = client
		.execute_json::<HashMap<String, String>>(client.new_request(Method::GET, "/info"))
		.await
		.expect_err("HTML body should not decode.");

	assert!(matches!(err, Error::Decode(DecodeError::Json { .. })));
}

#[tokio::test]
async fn token_failure_prevents_api_request() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"unauthorized\"}");
		})
		.await;
	let info = server
		.mock_async(|when, then| {
			when.method(GET).path("/info");
			then.status(200).body("{}");
		})
		.await;
	let client = build_client(&server);
	let err = client
		.execute(client.new_request(Method::GET, "/info"))
		.await
		.expect_err("Token failure should abort the request.");

	assert!(matches!(err, Error::TokenAcquisition(_)));

	token.assert_calls_async(1).await;
	info.assert_calls_async(0).await;
}

#[tokio::test]
async fn invalid_request_fails_before_sending() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let client = build_client(&server);
	let descriptor = client.new_request(Method::GET, "/info").header("bad header", "value");
	let err = client.execute(descriptor).await.expect_err("Invalid header should fail.");

	assert!(matches!(err, Error::RequestConstruction(_)));
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server).await;
	let client = build_client(&server);
	let mut descriptor = client.new_request(Method::GET, "/info");

	descriptor.url = "http://127.0.0.1:1/info".into();

	let err = client.execute(descriptor).await.expect_err("Unreachable API should fail.");

	match err {
		Error::Transport(TransportError::Network { method, url, .. }) => {
			assert_eq!(method, "GET");
			assert_eq!(url, "http://127.0.0.1:1/info");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
