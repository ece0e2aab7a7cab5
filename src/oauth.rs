//! OAuth client facade performing the client-credentials exchange.
//!
//! The `oauth2` crate owns the protocol details (form encoding, client authentication,
//! response parsing). This module configures it from a [`Config`], runs the exchange over the
//! token client of an [`HttpTransport`], and maps every failure into
//! [`TokenAcquisitionError`].

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenType,
	TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse,
	},
};
use serde::{Deserializer, de::Error as _};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::{ClientAuthMethod, Config},
	error::{ConfigError, TokenAcquisitionError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
};

type UnconfiguredClient = oauth2::Client<
	BasicErrorResponse,
	ClientCredentialsTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
>;
type ConfiguredClient = oauth2::Client<
	BasicErrorResponse,
	ClientCredentialsTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Boxed future returned by [`TokenExchange::exchange`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AccessToken, TokenAcquisitionError>> + 'a + Send>>;

/// Performs one token endpoint exchange per call. Caching lives in
/// [`TokenSource`](crate::TokenSource), never here.
pub trait TokenExchange
where
	Self: Send + Sync,
{
	/// Exchanges the client credentials for a fresh access token.
	fn exchange(&self) -> ExchangeFuture<'_>;
}

/// `token_type` label from a token response. Servers that omit it are treated as `bearer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenTypeLabel(pub String);
impl Default for TokenTypeLabel {
	fn default() -> Self {
		Self("bearer".into())
	}
}
impl TokenType for TokenTypeLabel {}

/// Token endpoint response accepted by the client.
///
/// Only `access_token` is mandatory; `token_type` defaults to `bearer` and a missing
/// `expires_in` yields a token that never expires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientCredentialsTokenResponse {
	access_token: oauth2::AccessToken,
	#[serde(default)]
	token_type: TokenTypeLabel,
	#[serde(
		default,
		deserialize_with = "deserialize_lenient_seconds",
		skip_serializing_if = "Option::is_none"
	)]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
}
impl TokenResponse for ClientCredentialsTokenResponse {
	type TokenType = TokenTypeLabel;

	fn access_token(&self) -> &oauth2::AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		None
	}
}

/// Accepts `expires_in` as a JSON number or a numeric string; `null` and `""` mean absent.
fn deserialize_lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Seconds {
		Number(u64),
		Text(String),
	}

	match Option::<Seconds>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Seconds::Number(secs)) => Ok(Some(secs)),
		Some(Seconds::Text(raw)) if raw.trim().is_empty() => Ok(None),
		Some(Seconds::Text(raw)) => raw.trim().parse().map(Some).map_err(|_| {
			D::Error::custom(format!("expires_in `{raw}` is not a number of seconds"))
		}),
	}
}

/// Client-credentials exchange backed by the `oauth2` crate and an [`HttpTransport`].
pub struct ClientCredentialsFacade {
	oauth_client: ConfiguredClient,
	transport: HttpTransport,
	token_url: String,
}
impl ClientCredentialsFacade {
	/// Configures the OAuth client for `<api_address>/oauth/token`.
	pub fn from_config(config: &Config, transport: HttpTransport) -> Result<Self, ConfigError> {
		let auth_url = config.authorization_endpoint();
		let auth_url = AuthUrl::new(auth_url.clone())
			.map_err(|source| ConfigError::InvalidEndpoint { url: auth_url, source })?;
		let token_endpoint = config.token_endpoint();
		let token_url = TokenUrl::new(token_endpoint.clone()).map_err(|source| {
			ConfigError::InvalidEndpoint { url: token_endpoint.clone(), source }
		})?;
		let mut oauth_client = UnconfiguredClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if matches!(config.client_auth, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, transport, token_url: token_endpoint })
	}

	async fn exchange_now(&self) -> Result<AccessToken, TokenAcquisitionError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.transport.token_handle(meta.clone());
		// A single empty scope sends `scope=` with the request.
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.add_scope(Scope::new(String::new()))
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(map_token_response(&response))
	}
}
impl TokenExchange for ClientCredentialsFacade {
	fn exchange(&self) -> ExchangeFuture<'_> {
		Box::pin(self.exchange_now())
	}
}
impl Debug for ClientCredentialsFacade {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsFacade")
			.field("token_url", &self.token_url)
			.finish()
	}
}

fn map_token_response(response: &ClientCredentialsTokenResponse) -> AccessToken {
	let expires_in = response
		.expires_in
		.and_then(|secs| i64::try_from(secs).ok())
		.filter(|secs| *secs > 0)
		.map(Duration::seconds);

	AccessToken::new(
		response.access_token().secret().to_owned(),
		OffsetDateTime::now_utc(),
		expires_in,
	)
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> TokenAcquisitionError {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => TokenAcquisitionError::Rejected {
			error: response.error().as_ref().to_string(),
			description: response.error_description().cloned(),
			status,
		},
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) =>
			TokenAcquisitionError::MalformedResponse { source, status },
		RequestTokenError::Other(message) =>
			TokenAcquisitionError::UnexpectedResponse { message, status },
	}
}

fn map_transport_error(
	status: Option<u16>,
	err: HttpClientError<ReqwestError>,
) -> TokenAcquisitionError {
	match err {
		HttpClientError::Reqwest(inner) => TokenAcquisitionError::network(*inner),
		HttpClientError::Http(inner) => TokenAcquisitionError::Http(inner),
		HttpClientError::Io(inner) => TokenAcquisitionError::Io(inner),
		HttpClientError::Other(message) => TokenAcquisitionError::UnexpectedResponse {
			message: format!("HTTP client error while calling the token endpoint: {message}"),
			status,
		},
		_ => TokenAcquisitionError::UnexpectedResponse {
			message: "HTTP client error while calling the token endpoint".into(),
			status,
		},
	}
}
