//! Cached, auto-refreshing bearer tokens with a singleflight guard.
//!
//! [`TokenSource`] delegates each exchange to a [`TokenExchange`] implementation and keeps
//! the resulting [`AccessToken`] until it expires. The cache is only touched while the async
//! guard is held, so concurrent callers piggy-back on the single in-flight exchange instead
//! of stampeding the token endpoint. A failed exchange clears the cache and surfaces the
//! error; nothing is retried here.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::TokenAcquisitionError,
	oauth::TokenExchange,
	obs::{self, Operation},
};

/// Produces valid bearer tokens, exchanging client credentials on first use and whenever the
/// cached token has expired.
#[derive(Clone)]
pub struct TokenSource {
	exchange: Arc<dyn TokenExchange>,
	cache: Arc<AsyncMutex<Option<AccessToken>>>,
	refresh_skew: Duration,
}
impl TokenSource {
	/// Margin before expiry at which a cached token is treated as expired.
	pub const DEFAULT_REFRESH_SKEW: Duration = Duration::seconds(10);

	/// Creates an empty source. No exchange happens until the first token request.
	pub fn new(exchange: Arc<dyn TokenExchange>) -> Self {
		Self {
			exchange,
			cache: Default::default(),
			refresh_skew: Self::DEFAULT_REFRESH_SKEW,
		}
	}

	/// Overrides the refresh skew (defaults to 10 seconds). Negative values count as zero.
	pub fn with_refresh_skew(mut self, skew: Duration) -> Self {
		self.refresh_skew = if skew.is_negative() { Duration::ZERO } else { skew };

		self
	}

	/// Returns the `Authorization` header value, `bearer <access-token>`.
	pub async fn get_token(&self) -> Result<String, TokenAcquisitionError> {
		self.token().await.map(|token| token.bearer())
	}

	/// Returns a valid access token, exchanging credentials if none is cached or the cached
	/// one has expired.
	pub async fn token(&self) -> Result<AccessToken, TokenAcquisitionError> {
		let mut cached = self.cache.lock().await;

		if let Some(current) =
			cached.as_ref().filter(|token| !token.is_expired(self.refresh_skew))
		{
			obs::debug_cache(true);

			return Ok(current.clone());
		}

		obs::debug_cache(false);
		// Drop the stale token before exchanging so a failure leaves nothing behind.
		*cached = None;

		let fresh = obs::observe(
			Operation::TokenExchange,
			"token_source",
			self.exchange.exchange(),
		)
		.await?;

		*cached = Some(fresh.clone());

		Ok(fresh)
	}

	/// Discards the cached token so the next request exchanges credentials again.
	pub async fn invalidate(&self) {
		*self.cache.lock().await = None;
	}

	/// Returns the cached token without exchanging, even if it has expired.
	pub async fn cached(&self) -> Option<AccessToken> {
		self.cache.lock().await.clone()
	}
}
impl Debug for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSource").field("refresh_skew", &self.refresh_skew).finish()
	}
}
