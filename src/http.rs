//! Transport primitives: the reqwest clients used for token exchanges and API requests.
//!
//! [`HttpTransport`] owns two clients built from the same TLS settings. The token client
//! never follows redirects, matching OAuth 2.0 guidance that token endpoints answer
//! directly; the API client keeps reqwest's default redirect policy. The token client is
//! adapted to the `oauth2` crate's [`AsyncHttpClient`] contract through [`TokenHttpHandle`],
//! which records the response status in a [`ResponseMetadataSlot`] so token errors can
//! report it.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{ClientBuilder, Request, Response, redirect::Policy};
// self
use crate::{
	_prelude::*,
	config::Config,
	error::{ConfigError, TransportError},
};

/// Captures metadata from the most recent token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// A fresh slot is created for each token exchange and read right after `oauth2` resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// HTTP clients shared by every request a [`Client`](crate::Client) issues.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	token_client: ReqwestClient,
	api_client: ReqwestClient,
}
impl HttpTransport {
	/// Builds both clients from `config`. No network I/O happens here.
	///
	/// With [`Config::skip_ssl_validation`] set, invalid certificates and hostnames are
	/// accepted.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		let token_client = Self::base_builder(config).redirect(Policy::none()).build()?;
		let api_client = Self::base_builder(config).build()?;

		Ok(Self { token_client, api_client })
	}

	/// Wraps caller-supplied clients. The token client should not follow redirects.
	pub fn with_clients(token_client: ReqwestClient, api_client: ReqwestClient) -> Self {
		Self { token_client, api_client }
	}

	/// Client used for API requests.
	pub fn api_client(&self) -> &ReqwestClient {
		&self.api_client
	}

	/// Client used for token exchanges.
	pub fn token_client(&self) -> &ReqwestClient {
		&self.token_client
	}

	/// Sends a wire request through the API client.
	pub async fn send(&self, request: Request) -> Result<Response, TransportError> {
		let method = request.method().to_string();
		let url = request.url().to_string();

		self.api_client
			.execute(request)
			.await
			.map_err(|source| TransportError::Network { method, url, source })
	}

	/// Builds an [`AsyncHttpClient`] handle for the token client that records outcomes in
	/// `slot`.
	pub(crate) fn token_handle(&self, slot: ResponseMetadataSlot) -> TokenHttpHandle {
		TokenHttpHandle { client: self.token_client.clone(), slot }
	}

	fn base_builder(config: &Config) -> ClientBuilder {
		let builder = ReqwestClient::builder();

		if config.skip_ssl_validation {
			builder.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true)
		} else {
			builder
		}
	}
}

/// [`AsyncHttpClient`] adapter over the token client.
pub struct TokenHttpHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for TokenHttpHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response = self
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			self.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
