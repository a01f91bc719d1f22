//! Client-credentials strategy factory.
//!
//! [`create_oauth_client_auth`] binds validated [`StrategyOptions`] to a [`TokenExchange`] and
//! returns an [`OAuthClientAuth`]: the credential accessor and the request hook sharing one
//! credential cache. Construction is pure; the token endpoint is first contacted on the
//! first [`auth`](OAuthClientAuth::auth) or [`hook`](OAuthClientAuth::hook) call.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialCache},
	config::StrategyOptions,
	exchange::TokenExchange,
	hook::{self, AuthFailure, AuthorizeRequest},
};
#[cfg(feature = "reqwest")] use crate::exchange::OAuth2Exchange;

/// Options accepted by [`OAuthClientAuth::auth`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthOptions {
	/// Bypasses the cached credential and fetches a new one.
	pub refresh: bool,
}
impl AuthOptions {
	/// Requests a forced refresh.
	pub fn force_refresh(mut self) -> Self {
		self.refresh = true;

		self
	}
}

/// Credential accessor plus request hook bound to one configuration.
///
/// Clones share the same cache, so a credential refreshed through one clone is visible to
/// all of them.
pub struct OAuthClientAuth<T> {
	cache: Arc<CredentialCache<T>>,
}
impl<T> OAuthClientAuth<T>
where
	T: TokenExchange,
{
	/// Creates a strategy with an empty credential cache.
	pub fn new(options: StrategyOptions, exchange: T) -> Self {
		Self { cache: Arc::new(CredentialCache::new(options, exchange)) }
	}

	/// Returns a bearer credential, fetching one when none is cached or a refresh is requested.
	pub async fn auth(&self, options: AuthOptions) -> Result<Credential> {
		self.cache.get_credential(options.refresh).await
	}

	/// Authorizes `request` and dispatches it, retrying once with a fresh credential when the
	/// upstream answers `401 Unauthorized`. See [`hook::hook_request`].
	pub async fn hook<R, D, Fut, S, E>(&self, request: R, dispatch: D) -> Result<S>
	where
		R: AuthorizeRequest,
		D: FnMut(R) -> Fut,
		Fut: Future<Output = Result<S, E>>,
		S: AuthFailure,
		E: 'static + Send + Sync + StdError + AuthFailure,
	{
		hook::hook_request(&self.cache, request, dispatch).await
	}

	/// Drops the cached credential so the next call fetches a new one.
	pub fn invalidate(&self) {
		self.cache.invalidate();
	}

	/// Configuration the strategy was built with.
	pub fn options(&self) -> &StrategyOptions {
		self.cache.options()
	}

	/// Shared credential cache.
	pub fn cache(&self) -> &Arc<CredentialCache<T>> {
		&self.cache
	}
}
#[cfg(feature = "reqwest")]
impl OAuthClientAuth<OAuth2Exchange> {
	/// Creates a strategy that talks to `token_endpoint` through [`OAuth2Exchange`].
	pub fn with_token_endpoint(options: StrategyOptions, token_endpoint: Url) -> Result<Self> {
		Ok(Self::new(options, OAuth2Exchange::new(token_endpoint)?))
	}
}
impl<T> Clone for OAuthClientAuth<T> {
	fn clone(&self) -> Self {
		Self { cache: Arc::clone(&self.cache) }
	}
}
impl<T> Debug for OAuthClientAuth<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClientAuth").field("cache", &self.cache).finish()
	}
}

/// Builds the client-credentials strategy for `options`.
///
/// Each call owns a fresh cache; no I/O happens here.
pub fn create_oauth_client_auth<T>(options: StrategyOptions, exchange: T) -> OAuthClientAuth<T>
where
	T: TokenExchange,
{
	OAuthClientAuth::new(options, exchange)
}
