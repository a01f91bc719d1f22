//! OAuth 2.0 client-credentials strategy: a cached bearer credential accessor plus a request
//! hook that attaches the credential to outgoing requests and retries once, with a freshly
//! minted credential, when the upstream answers `401 Unauthorized`.
//!
//! ```no_run
//! # async fn demo() -> oauth2_client_auth::error::Result<()> {
//! use oauth2_client_auth::{
//! 	config::StrategyOptions,
//! 	reqwest::{Client, Method, Request},
//! 	strategy::{AuthOptions, OAuthClientAuth},
//! 	url::Url,
//! };
//!
//! let options = StrategyOptions::builder("my-service", "my-secret").scope("api.read").build()?;
//! let token_endpoint = Url::parse("https://idp.example.com/oauth/token").expect("valid URL");
//! let auth = OAuthClientAuth::with_token_endpoint(options, token_endpoint)?;
//! let credential = auth.auth(AuthOptions::default()).await?;
//!
//! println!("Token type: {}.", credential.token_type);
//!
//! let client = Client::new();
//! let request = Request::new(Method::GET, Url::parse("https://api.example.com/me").expect("valid URL"));
//! let response = auth.hook(request, |request| client.execute(request)).await?;
//!
//! println!("Status: {}.", response.status());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod exchange;
pub mod hook;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod strategy;
#[cfg(test)]
mod _preludet {
	//! Shared fixtures for unit tests.

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::StrategyOptions,
		error::AuthenticationError,
		exchange::{ExchangeFuture, TokenExchange, TokenGrant},
	};

	/// Scripted token exchange that counts calls.
	///
	/// Queued outcomes are served in order; once the queue is empty every call succeeds
	/// with `token-<call number>`.
	#[derive(Default)]
	pub struct StubExchange {
		outcomes: Mutex<VecDeque<Result<TokenGrant, AuthenticationError>>>,
		calls: AtomicUsize,
	}
	impl StubExchange {
		pub fn with_tokens<I>(tokens: I) -> Self
		where
			I: IntoIterator<Item = &'static str>,
		{
			let stub = Self::default();

			for token in tokens {
				stub.push(Ok(TokenGrant::bearer(token)));
			}

			stub
		}

		pub fn push(&self, outcome: Result<TokenGrant, AuthenticationError>) {
			self.outcomes.lock().push_back(outcome);
		}

		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl TokenExchange for StubExchange {
		fn exchange<'a>(&'a self, options: &'a StrategyOptions) -> ExchangeFuture<'a> {
			Box::pin(async move {
				let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

				assert_eq!(options.client_secret.expose(), "secret1");
				tokio::task::yield_now().await;

				let next = self.outcomes.lock().pop_front();

				match next {
					Some(outcome) => outcome.map_err(Error::from),
					None => Ok(TokenGrant::bearer(format!("token-{call}"))),
				}
			})
		}
	}

	pub fn options() -> StrategyOptions {
		StrategyOptions::builder("id1", "secret1")
			.build()
			.expect("Fixture options should be valid.")
	}

	pub fn invalid_client() -> AuthenticationError {
		AuthenticationError::InvalidClient { reason: "invalid_client".into() }
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
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use strategy::{OAuthClientAuth, create_oauth_client_auth};
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
