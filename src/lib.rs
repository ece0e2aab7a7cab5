//! Client-credentials OAuth 2.0 API client: lazily acquired, auto-refreshing bearer tokens
//! attached to every request sent to a resource API.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod request;
pub mod token_source;

pub use client::{Client, decode_json};
pub use config::Config;
pub use error::{Error, Result};
pub use request::{Body, RequestDescriptor};
pub use token_source::TokenSource;

#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{client::Client, config::Config};

	/// Builds a configuration pointing at `api_address` with fixed test credentials.
	///
	/// TLS verification is disabled so self-signed mock servers are reachable.
	pub fn test_config(api_address: &str) -> Config {
		Config::builder(api_address, "test-client", "test-secret")
			.skip_ssl_validation(true)
			.build()
			.expect("Failed to build test configuration.")
	}

	/// Builds a [`Client`] for `api_address` using [`test_config`].
	pub fn build_test_client(api_address: &str) -> Client {
		Client::new(test_config(api_address)).expect("Failed to build test client.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
