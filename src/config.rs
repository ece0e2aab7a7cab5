//! Validated client configuration and the helpers that derive OAuth endpoints from it.
//!
//! A [`Config`] is immutable once built. The API address is kept verbatim so request paths
//! are appended exactly as supplied, while [`Config::api_url`] exposes the parsed form.

/// Builder that validates raw settings into a [`Config`].
pub mod builder;
pub mod env;
/// Grant types and client authentication methods.
pub mod grant;

pub use builder::*;
pub use grant::*;

// self
use crate::{_prelude::*, auth::Secret};

/// Path of the token endpoint, relative to the API address.
pub const TOKEN_PATH: &str = "/oauth/token";
/// Path of the authorization endpoint, relative to the API address.
pub const AUTHORIZATION_PATH: &str = "/oauth/auth";

/// Immutable settings consumed by [`Client`](crate::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	api_address: String,
	api_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret; redacted in logs.
	pub client_secret: Secret,
	/// Grant type used at the token endpoint.
	pub grant_type: GrantType,
	/// Accept server certificates without verification. Development only.
	pub skip_ssl_validation: bool,
	/// How client credentials are presented to the token endpoint.
	pub client_auth: ClientAuthMethod,
}
impl Config {
	/// Creates a builder for the required address and credentials.
	pub fn builder(
		api_address: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ConfigBuilder {
		ConfigBuilder::new(api_address, client_id, client_secret)
	}

	/// API base address exactly as configured.
	pub fn api_address(&self) -> &str {
		&self.api_address
	}

	/// Parsed API base address.
	pub fn api_url(&self) -> &Url {
		&self.api_url
	}

	/// Resolves `path` against the API address by plain concatenation.
	pub fn resolve(&self, path: &str) -> String {
		format!("{}{path}", self.api_address)
	}

	/// Token endpoint URL (`<api_address>/oauth/token`).
	pub fn token_endpoint(&self) -> String {
		self.resolve(TOKEN_PATH)
	}

	/// Authorization endpoint URL (`<api_address>/oauth/auth`).
	pub fn authorization_endpoint(&self) -> String {
		self.resolve(AUTHORIZATION_PATH)
	}
}
