//! Token-exchange transport contract.
//!
//! The credential cache only knows [`TokenExchange`]: give it the bound
//! [`StrategyOptions`] and it resolves to a [`TokenGrant`] or an error. With the `reqwest`
//! feature the crate ships [`OAuth2Exchange`], which performs the client-credentials grant
//! through the `oauth2` crate; tests and custom stacks plug in their own implementation.

pub mod classify;

#[cfg(feature = "reqwest")] mod oauth;

pub use classify::*;
#[cfg(feature = "reqwest")] pub use oauth::*;

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	config::StrategyOptions,
};

/// Boxed future returned by [`TokenExchange::exchange`].
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenGrant>> + 'a + Send>>;

/// Performs the client-credentials grant against a token endpoint.
///
/// Implementations report endpoint and network failures as
/// [`Error::Authentication`](crate::error::Error::Authentication) and misconfiguration they
/// only discover at call time as [`Error::Config`](crate::error::Error::Config).
pub trait TokenExchange
where
	Self: Send + Sync,
{
	/// Exchanges the configured client credentials for an access token.
	fn exchange<'a>(&'a self, options: &'a StrategyOptions) -> ExchangeFuture<'a>;
}
impl<T> TokenExchange for Arc<T>
where
	T: ?Sized + TokenExchange,
{
	fn exchange<'a>(&'a self, options: &'a StrategyOptions) -> ExchangeFuture<'a> {
		(**self).exchange(options)
	}
}

/// Successful token endpoint response.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// `token_type` reported by the endpoint (normally `bearer`).
	pub token_type: String,
	/// Scopes the endpoint declared as granted, if it echoed any.
	pub scope: Option<ScopeSet>,
	/// Declared lifetime; informational only.
	pub expires_in: Option<Duration>,
}
impl TokenGrant {
	/// Creates a bearer grant without scope or lifetime metadata.
	pub fn bearer(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: "bearer".into(),
			scope: None,
			expires_in: None,
		}
	}

	/// Overrides the reported token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Records the scopes the endpoint declared.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Records the declared lifetime.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::Credential;

	#[test]
	fn grant_builders_flow_into_credentials() {
		let granted = ScopeSet::new(["orders.read"]).expect("Scope fixture should be valid.");
		let grant = TokenGrant::bearer("tok-A")
			.with_token_type("DPoP")
			.with_scope(granted.clone())
			.with_expires_in(Duration::minutes(5));
		let credential = Credential::from_grant(grant, &ScopeSet::default());

		assert_eq!(credential.token_type, "DPoP");
		assert_eq!(credential.scope, granted);
		assert_eq!(credential.expires_in, Some(Duration::minutes(5)));
		assert_eq!(credential.authorization(), "Bearer tok-A");
	}
}
