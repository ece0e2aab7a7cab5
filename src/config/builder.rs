// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::{ClientAuthMethod, Config, GrantType},
	error::ConfigError,
};

/// Builder for [`Config`] values.
#[derive(Debug)]
pub struct ConfigBuilder {
	/// API base address the paths are appended to.
	pub api_address: String,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Optional raw grant-type override.
	pub grant_type: Option<String>,
	/// Accept server certificates without verification.
	pub skip_ssl_validation: bool,
	/// Client authentication method for the token endpoint.
	pub client_auth: ClientAuthMethod,
}
impl ConfigBuilder {
	/// Creates a new builder seeded with the required fields.
	pub fn new(
		api_address: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			api_address: api_address.into(),
			client_id: client_id.into(),
			client_secret: Secret::new(client_secret),
			grant_type: None,
			skip_ssl_validation: false,
			client_auth: ClientAuthMethod::default(),
		}
	}

	/// Overrides the grant type. Only `client_credentials` is accepted at build time.
	pub fn grant_type(mut self, grant: impl Into<String>) -> Self {
		self.grant_type = Some(grant.into());

		self
	}

	/// Disables TLS certificate and hostname verification.
	///
	/// Never enable this outside local development.
	pub fn skip_ssl_validation(mut self, skip: bool) -> Self {
		self.skip_ssl_validation = skip;

		self
	}

	/// Overrides how client credentials are presented to the token endpoint.
	pub fn client_auth(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth = method;

		self
	}

	/// Validates the builder and produces a [`Config`].
	pub fn build(self) -> Result<Config, ConfigError> {
		if self.api_address.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "api_address" });
		}
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "client_id" });
		}
		if self.client_secret.expose().is_empty() {
			return Err(ConfigError::MissingField { field: "client_secret" });
		}

		let api_url = Url::parse(&self.api_address).map_err(|source| {
			ConfigError::InvalidApiAddress { address: self.api_address.clone(), source }
		})?;

		if !matches!(api_url.scheme(), "http" | "https") || api_url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedApiAddress { address: self.api_address });
		}

		let grant_type = match self.grant_type.as_deref().map(str::trim) {
			None | Some("") => GrantType::default(),
			Some(raw) => raw.parse()?,
		};

		Ok(Config {
			api_address: self.api_address,
			api_url,
			client_id: self.client_id,
			client_secret: self.client_secret,
			grant_type,
			skip_ssl_validation: self.skip_ssl_validation,
			client_auth: self.client_auth,
		})
	}
}
