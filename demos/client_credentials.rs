//! Acquires a bearer token and calls two resource endpoints.
//!
//! With `UAA_APIADDRESS`, `UAA_CLIENTID`, and `UAA_CLIENTSECRET` set, the demo talks to that
//! server; otherwise it starts a local mock that answers the token endpoint, `/info`, and
//! `/Users`.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use reqwest::Method;
// self
use oauth2_api_client::{Client, Config};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let (config, _server) = if std::env::var_os("UAA_APIADDRESS").is_some() {
		(Config::from_env("UAA")?, None)
	} else {
		let server = mock_uaa().await;
		// The mock server presents a self-signed certificate.
		let config = Config::builder(server.base_url(), "demo-client", "demo-secret")
			.skip_ssl_validation(true)
			.build()?;

		(config, Some(server))
	};
	let client = Client::new(config)?;

	println!("Token: {}", client.get_token().await?);

	for path in ["/info", "/Users"] {
		let descriptor =
			client.new_request(Method::GET, path).header("Accept", "application/json");
		let response = client.execute(descriptor).await?;
		let status = response.status();
		let body = response.text().await?;

		println!("GET {path} -> {status}\n{body}");
	}

	Ok(())
}

async fn mock_uaa() -> MockServer {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":900}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/info").header_exists("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"app\":{\"version\":\"demo\"},\"zone_name\":\"uaa\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/Users").header_exists("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"resources\":[],\"totalResults\":0}");
		})
		.await;

	server
}
