//! The long-lived [`Client`] aggregate and JSON response decoding.
//!
//! A client owns its [`Config`], the [`HttpTransport`], and the [`TokenSource`]. Building one
//! performs no network I/O; the first token exchange happens on the first call that needs a
//! token. Every [`Client::execute`] awaits the bearer value before the wire request is built,
//! so token acquisition always completes (or fails) before the dependent request is sent.

// crates.io
use reqwest::{Method, Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::Config,
	error::DecodeError,
	http::HttpTransport,
	oauth::{ClientCredentialsFacade, TokenExchange},
	obs::{self, Operation},
	request::RequestDescriptor,
	token_source::TokenSource,
};

/// Authenticated client for a single resource API.
///
/// Cloning is cheap; clones share the transport and the token cache.
#[derive(Clone, Debug)]
pub struct Client {
	config: Arc<Config>,
	transport: HttpTransport,
	token_source: TokenSource,
}
impl Client {
	/// Builds a client whose token source exchanges credentials through the `oauth2` facade.
	pub fn new(config: Config) -> Result<Self> {
		let transport = HttpTransport::from_config(&config)?;

		Self::with_transport(config, transport)
	}

	/// Builds a client on top of caller-supplied HTTP clients.
	pub fn with_transport(config: Config, transport: HttpTransport) -> Result<Self> {
		let facade = ClientCredentialsFacade::from_config(&config, transport.clone())?;

		Ok(Self::with_exchange(config, transport, Arc::new(facade)))
	}

	/// Builds a client around a custom [`TokenExchange`].
	pub fn with_exchange(
		config: Config,
		transport: HttpTransport,
		exchange: Arc<dyn TokenExchange>,
	) -> Self {
		Self { config: Arc::new(config), transport, token_source: TokenSource::new(exchange) }
	}

	/// Overrides the token source's refresh skew.
	pub fn with_refresh_skew(mut self, skew: Duration) -> Self {
		self.token_source = self.token_source.with_refresh_skew(skew);

		self
	}

	/// Configuration the client was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Token source shared by every clone of this client.
	pub fn token_source(&self) -> &TokenSource {
		&self.token_source
	}

	/// Returns the `Authorization` header value, `bearer <access-token>`.
	pub async fn get_token(&self) -> Result<String> {
		Ok(self.token_source.get_token().await?)
	}

	/// Starts a request for `path`, appended verbatim to the API address.
	pub fn new_request(&self, method: Method, path: &str) -> RequestDescriptor {
		RequestDescriptor::new(method, self.config.resolve(path))
	}

	/// Sends `descriptor` with the current bearer token and returns the raw response.
	///
	/// Non-success statuses are not errors here; inspect [`Response::status`]. Dropping the
	/// response releases its body.
	pub async fn execute(&self, mut descriptor: RequestDescriptor) -> Result<Response> {
		let bearer = self.get_token().await?;

		descriptor.set_header(AUTHORIZATION.as_str(), bearer);

		obs::observe(Operation::ApiRequest, "execute", async move {
			let request = descriptor.into_wire()?;

			Ok::<_, Error>(self.transport.send(request).await?)
		})
		.await
	}

	/// Sends `descriptor` and decodes the response body as JSON.
	pub async fn execute_json<T>(&self, descriptor: RequestDescriptor) -> Result<T>
	where
		T: DeserializeOwned,
	{
		decode_json(self.execute(descriptor).await?).await
	}
}

/// Reads the whole body of `response` and decodes it as JSON into `T`.
///
/// The response is consumed on every path, which releases the connection. Decoding stops
/// after the first JSON value; trailing bytes are ignored.
pub async fn decode_json<T>(response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let bytes = response.bytes().await.map_err(|source| DecodeError::Read { source })?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);
	let value =
		serde_path_to_error::deserialize(&mut de).map_err(|source| DecodeError::Json { source })?;

	Ok(value)
}
