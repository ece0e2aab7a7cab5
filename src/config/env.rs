//! Environment-driven configuration loading.
//!
//! Variables are named `<PREFIX>_<FIELD>` with the field names upper-cased and unseparated,
//! e.g. `UAA_APIADDRESS`, `UAA_CLIENTID`, `UAA_CLIENTSECRET`, `UAA_GRANTTYPE`, and
//! `UAA_SKIPSSLVALIDATION`.

// self
use crate::{_prelude::*, config::Config, error::ConfigError};

impl Config {
	/// Loads a configuration from process environment variables under `prefix`.
	pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
		Self::from_lookup(prefix, |key| std::env::var(key).ok())
	}

	/// Loads a configuration by resolving each `<PREFIX>_<FIELD>` key through `lookup`.
	pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let prefix = prefix.to_ascii_uppercase();
		let read = |field: &str| lookup(&format!("{prefix}_{field}"));
		let required = |field: &str, name: &'static str| {
			read(field)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingField { field: name })
		};
		let api_address = required("APIADDRESS", "api_address")?;
		let client_id = required("CLIENTID", "client_id")?;
		let client_secret = required("CLIENTSECRET", "client_secret")?;
		let skip_ssl_validation = match read("SKIPSSLVALIDATION") {
			Some(raw) => parse_flag("skip_ssl_validation", &raw)?,
			None => false,
		};
		let mut builder = Config::builder(api_address, client_id, client_secret)
			.skip_ssl_validation(skip_ssl_validation);

		if let Some(grant) = read("GRANTTYPE") {
			builder = builder.grant_type(grant);
		}

		builder.build()
	}
}

fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.trim() {
		"" => Ok(false),
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
		_ => Err(ConfigError::InvalidFlag { field, value: raw.to_owned() }),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();

		move |key| vars.get(key).cloned()
	}

	#[test]
	fn loads_required_and_optional_fields() {
		let config = Config::from_lookup(
			"uaa",
			lookup(&[
				("UAA_APIADDRESS", "https://uaa.example.com"),
				("UAA_CLIENTID", "admin"),
				("UAA_CLIENTSECRET", "admin-secret"),
				("UAA_SKIPSSLVALIDATION", "T"),
				("UAA_GRANTTYPE", "client_credentials"),
			]),
		)
		.expect("Complete environment should load.");

		assert_eq!(config.api_address(), "https://uaa.example.com");
		assert_eq!(config.client_id, "admin");
		assert_eq!(config.client_secret.expose(), "admin-secret");
		assert!(config.skip_ssl_validation);
	}

	#[test]
	fn missing_required_variable_is_reported() {
		let err = Config::from_lookup(
			"UAA",
			lookup(&[("UAA_APIADDRESS", "https://uaa.example.com"), ("UAA_CLIENTID", "admin")]),
		)
		.expect_err("Missing client secret should fail.");

		assert!(matches!(err, ConfigError::MissingField { field: "client_secret" }));
	}

	#[test]
	fn flag_parsing_matches_boolean_spellings() {
		assert!(parse_flag("f", "1").expect("`1` should parse."));
		assert!(!parse_flag("f", "False").expect("`False` should parse."));
		assert!(!parse_flag("f", "").expect("Empty flag should default to false."));
		assert!(matches!(parse_flag("f", "yes"), Err(ConfigError::InvalidFlag { .. })));
	}
}
