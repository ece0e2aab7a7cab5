//! Access tokens issued by the token endpoint and their expiry rules.

// self
use crate::{_prelude::*, auth::Secret};

/// Scheme prefix of the `Authorization` header value.
pub const BEARER_PREFIX: &str = "bearer ";

/// Access token cached by a [`TokenSource`](crate::TokenSource).
///
/// Tokens without an expiry (the server omitted `expires_in` or sent zero) never expire.
#[derive(Clone)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub secret: Secret,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Instant the token stops being valid, if the server supplied one.
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Creates a token received at `issued_at`, valid for `expires_in` when supplied.
	///
	/// An `expires_in` too large to represent yields a token without expiry.
	pub fn new(
		secret: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_in: Option<Duration>,
	) -> Self {
		Self {
			secret: Secret::new(secret),
			issued_at,
			expires_at: expires_in.and_then(|delta| issued_at.checked_add(delta)),
		}
	}

	/// Returns `true` if the token is expired at `instant`, treating it as expired `skew`
	/// before the real expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime, skew: Duration) -> bool {
		match self.expires_at {
			Some(expires_at) => instant.saturating_add(skew) >= expires_at,
			None => false,
		}
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self, skew: Duration) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc(), skew)
	}

	/// Renders the `Authorization` header value, `bearer <access-token>`.
	pub fn bearer(&self) -> String {
		format!("{BEARER_PREFIX}{}", self.secret.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
