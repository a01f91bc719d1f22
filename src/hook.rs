//! Request hook that authorizes outgoing requests and retries once after a `401`.
//!
//! [`hook_request`] pulls a credential from a [`CredentialCache`], attaches it to the request,
//! and hands the request to a caller-supplied dispatch function. When the upstream rejects
//! the credential, it is evicted from the cache (unless a concurrent caller already replaced
//! it), a fresh credential is obtained, and the retained copy of the request is dispatched
//! exactly once more. The second outcome is returned as-is,
//! even when it is another authorization failure.
//!
//! Request and response types plug in through [`AuthorizeRequest`] and [`AuthFailure`];
//! implementations ship for the `http` types re-exported by `oauth2` and, with the `reqwest`
//! feature, for reqwest's request, response, and error types.

// std
use std::convert::Infallible;
// crates.io
use oauth2::http::{
	Request as HttpRequest, Response as HttpResponse, StatusCode,
	header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialCache},
	error::{AuthenticationError, UpstreamError},
	exchange::TokenExchange,
	obs::{self, AuthOperation, AuthOutcome, AuthSpan},
};

/// Outgoing request the hook can authorize and duplicate.
pub trait AuthorizeRequest
where
	Self: Sized,
{
	/// Sets the `Authorization` header from `credential`, replacing any previous value.
	fn authorize(&mut self, credential: &Credential) -> Result<(), AuthenticationError>;

	/// Duplicates the request for a retry; `None` when the body cannot be replayed.
	fn try_clone(&self) -> Option<Self>;
}
impl<B> AuthorizeRequest for HttpRequest<B>
where
	B: Clone,
{
	fn authorize(&mut self, credential: &Credential) -> Result<(), AuthenticationError> {
		self.headers_mut().insert(AUTHORIZATION, bearer_header(credential)?);

		Ok(())
	}

	fn try_clone(&self) -> Option<Self> {
		Some(self.clone())
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizeRequest for reqwest::Request {
	fn authorize(&mut self, credential: &Credential) -> Result<(), AuthenticationError> {
		self.headers_mut().insert(AUTHORIZATION, bearer_header(credential)?);

		Ok(())
	}

	fn try_clone(&self) -> Option<Self> {
		reqwest::Request::try_clone(self)
	}
}

/// Dispatch outcome that may signal a rejected credential.
pub trait AuthFailure {
	/// Returns `true` when the upstream answered `401 Unauthorized`.
	fn is_unauthorized(&self) -> bool;
}
impl<S, E> AuthFailure for Result<S, E>
where
	S: AuthFailure,
	E: AuthFailure,
{
	fn is_unauthorized(&self) -> bool {
		match self {
			Ok(response) => response.is_unauthorized(),
			Err(e) => e.is_unauthorized(),
		}
	}
}
impl<B> AuthFailure for HttpResponse<B> {
	fn is_unauthorized(&self) -> bool {
		self.status() == StatusCode::UNAUTHORIZED
	}
}
#[cfg(feature = "reqwest")]
impl AuthFailure for reqwest::Response {
	fn is_unauthorized(&self) -> bool {
		self.status() == StatusCode::UNAUTHORIZED
	}
}
#[cfg(feature = "reqwest")]
impl AuthFailure for ReqwestError {
	fn is_unauthorized(&self) -> bool {
		self.status() == Some(StatusCode::UNAUTHORIZED)
	}
}
impl AuthFailure for std::io::Error {
	fn is_unauthorized(&self) -> bool {
		false
	}
}
impl AuthFailure for Infallible {
	fn is_unauthorized(&self) -> bool {
		match *self {}
	}
}

/// Authorizes `request` with the cached credential and dispatches it.
///
/// A `401` outcome (response or error) triggers one retry with a freshly fetched credential.
/// Credential failures surface as [`Error::Authentication`] or [`Error::Config`]; dispatch
/// failures are wrapped in [`Error::Upstream`]. Requests whose
/// [`try_clone`](AuthorizeRequest::try_clone) yields `None` are never retried.
pub async fn hook_request<T, R, D, Fut, S, E>(
	cache: &CredentialCache<T>,
	request: R,
	mut dispatch: D,
) -> Result<S>
where
	T: TokenExchange,
	R: AuthorizeRequest,
	D: FnMut(R) -> Fut,
	Fut: Future<Output = Result<S, E>>,
	S: AuthFailure,
	E: 'static + Send + Sync + StdError + AuthFailure,
{
	const OPERATION: AuthOperation = AuthOperation::Hook;

	let span = AuthSpan::new(OPERATION, "dispatch");

	span.instrument(async move {
		obs::record_outcome(OPERATION, AuthOutcome::Attempt);

		let result = authorize_and_dispatch(cache, request, &mut dispatch).await;

		obs::record_outcome(
			OPERATION,
			if result.is_ok() { AuthOutcome::Success } else { AuthOutcome::Failure },
		);

		result
	})
	.await
}

async fn authorize_and_dispatch<T, R, D, Fut, S, E>(
	cache: &CredentialCache<T>,
	mut request: R,
	dispatch: &mut D,
) -> Result<S>
where
	T: TokenExchange,
	R: AuthorizeRequest,
	D: FnMut(R) -> Fut,
	Fut: Future<Output = Result<S, E>>,
	S: AuthFailure,
	E: 'static + Send + Sync + StdError + AuthFailure,
{
	let credential = cache.get_credential(false).await?;

	request.authorize(&credential)?;

	let retained = request.try_clone();
	let outcome = dispatch(request).await;

	if !outcome.is_unauthorized() {
		return outcome.map_err(|e| UpstreamError::new(e).into());
	}

	let Some(mut retry) = retained else {
		return outcome.map_err(|e| UpstreamError::new(e).into());
	};

	obs::record_outcome(AuthOperation::Hook, AuthOutcome::Retry);

	#[cfg(feature = "tracing")]
	tracing::debug!(
		client_id = %cache.options().client_id,
		"Upstream rejected the credential; refreshing and retrying once."
	);

	// Another hook may already have replaced the rejected credential; keep that one.
	cache.invalidate_rejected(&credential);

	let credential = cache.get_credential(false).await?;

	retry.authorize(&credential)?;

	dispatch(retry).await.map_err(|e| UpstreamError::new(e).into())
}

fn bearer_header(credential: &Credential) -> Result<HeaderValue, AuthenticationError> {
	let mut value = HeaderValue::from_str(&credential.authorization())
		.map_err(|_| AuthenticationError::MalformedToken)?;

	value.set_sensitive(true);

	Ok(value)
}
