//! Credential cache with single-flight fetches.
//!
//! [`CredentialCache`] owns exactly one credential slot. A lookup returns the cached
//! credential untouched; a miss (or a forced refresh) calls the [`TokenExchange`] with the
//! bound [`StrategyOptions`] and stores the result. Failed exchanges never touch the slot,
//! so the next lookup simply tries again. Fetches are serialized by an async guard:
//! callers that miss while another fetch is in flight wait for it and reuse its result
//! instead of stampeding the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	config::StrategyOptions,
	exchange::TokenExchange,
	obs::{self, AuthOperation, AuthOutcome, AuthSpan},
};

/// Single-slot credential cache bound to one configuration.
pub struct CredentialCache<T> {
	options: Arc<StrategyOptions>,
	exchange: T,
	slot: RwLock<Option<Credential>>,
	fetch_guard: AsyncMutex<()>,
}
impl<T> CredentialCache<T>
where
	T: TokenExchange,
{
	/// Creates an empty cache; no I/O happens until the first lookup.
	pub fn new(options: impl Into<Arc<StrategyOptions>>, exchange: T) -> Self {
		Self {
			options: options.into(),
			exchange,
			slot: RwLock::new(None),
			fetch_guard: AsyncMutex::new(()),
		}
	}

	/// Configuration the cache fetches with.
	pub fn options(&self) -> &StrategyOptions {
		&self.options
	}

	/// Token exchange backing the cache.
	pub fn exchange(&self) -> &T {
		&self.exchange
	}

	/// Returns the cached credential without fetching.
	pub fn cached(&self) -> Option<Credential> {
		self.slot.read().clone()
	}

	/// Returns a usable credential, fetching one when the slot is empty or
	/// `force_refresh` is set.
	///
	/// On failure the slot keeps whatever it held before the call.
	pub async fn get_credential(&self, force_refresh: bool) -> Result<Credential> {
		const OPERATION: AuthOperation = AuthOperation::Fetch;

		let span = AuthSpan::new(OPERATION, if force_refresh { "refresh" } else { "lookup" });

		span.instrument(async move {
			if let Some(current) = self.reusable(force_refresh) {
				obs::record_outcome(OPERATION, AuthOutcome::Reuse);

				return Ok(current);
			}

			let _singleflight = self.fetch_guard.lock().await;

			// Another caller may have filled the slot while we waited.
			if let Some(current) = self.reusable(force_refresh) {
				obs::record_outcome(OPERATION, AuthOutcome::Reuse);

				return Ok(current);
			}

			obs::record_outcome(OPERATION, AuthOutcome::Attempt);

			match self.exchange.exchange(&self.options).await {
				Ok(grant) => {
					let credential = Credential::from_grant(grant, &self.options.scope);

					*self.slot.write() = Some(credential.clone());

					obs::record_outcome(OPERATION, AuthOutcome::Success);

					Ok(credential)
				},
				Err(e) => {
					obs::record_outcome(OPERATION, AuthOutcome::Failure);

					Err(e)
				},
			}
		})
		.await
	}

	/// Drops the cached credential; a no-op when the slot is already empty.
	pub fn invalidate(&self) {
		let evicted = self.slot.write().take();

		self.record_eviction(evicted.is_some());
	}

	/// Drops the cached credential only while it still carries the token of `rejected`.
	///
	/// Returns `true` when the slot was cleared. A credential that replaced `rejected` in the
	/// meantime is kept.
	pub fn invalidate_rejected(&self, rejected: &Credential) -> bool {
		let evicted = {
			let mut slot = self.slot.write();

			if slot.as_ref().is_some_and(|current| current.token == rejected.token) {
				slot.take()
			} else {
				None
			}
		};
		let evicted = evicted.is_some();

		self.record_eviction(evicted);

		evicted
	}

	fn record_eviction(&self, evicted: bool) {
		if evicted {
			obs::record_outcome(AuthOperation::Invalidate, AuthOutcome::Success);

			#[cfg(feature = "tracing")]
			tracing::debug!(
				client_id = %self.options.client_id,
				scope = self.options.scope.fingerprint(),
				"Cached credential invalidated."
			);
		}
	}

	fn reusable(&self, force_refresh: bool) -> Option<Credential> {
		if force_refresh { None } else { self.cached() }
	}
}
impl<T> Debug for CredentialCache<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("client_id", &self.options.client_id)
			.field("cached", &self.slot.read().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, error::AuthenticationError};

	#[tokio::test]
	async fn cached_credential_is_reused() {
		let cache = CredentialCache::new(options(), StubExchange::with_tokens(["tok-A"]));

		for _ in 0..5 {
			let credential =
				cache.get_credential(false).await.expect("Cached lookups should succeed.");

			assert_eq!(credential.token.expose(), "tok-A");
		}

		assert_eq!(cache.exchange().calls(), 1);
	}

	#[tokio::test]
	async fn forced_refresh_always_fetches() {
		let cache = CredentialCache::new(options(), StubExchange::with_tokens(["tok-A", "tok-B"]));

		cache.get_credential(false).await.expect("Initial fetch should succeed.");

		let refreshed = cache.get_credential(true).await.expect("Forced refresh should succeed.");

		assert_eq!(refreshed.token.expose(), "tok-B");
		assert_eq!(cache.exchange().calls(), 2);
		assert_eq!(
			cache.cached().map(|credential| credential.token.expose().to_owned()),
			Some("tok-B".into())
		);

		cache.get_credential(true).await.expect("Forced refresh on a full slot should succeed.");

		assert_eq!(cache.exchange().calls(), 3);
	}

	#[tokio::test]
	async fn invalidate_then_lookup_fetches() {
		let cache = CredentialCache::new(options(), StubExchange::default());

		cache.invalidate();
		cache.get_credential(false).await.expect("Initial fetch should succeed.");
		cache.invalidate();

		assert!(cache.cached().is_none());

		let credential = cache.get_credential(false).await.expect("Refetch should succeed.");

		assert_eq!(credential.token.expose(), "token-2");
		assert_eq!(cache.exchange().calls(), 2);
	}

	#[tokio::test]
	async fn failed_fetch_leaves_slot_empty_and_retries_next_time() {
		let stub = StubExchange::default();

		stub.push(Err(invalid_client()));

		let cache = CredentialCache::new(options(), stub);
		let err = cache.get_credential(false).await.expect_err("Exchange failures must surface.");

		assert!(matches!(err, Error::Authentication(AuthenticationError::InvalidClient { .. })));
		assert!(cache.cached().is_none());

		let credential = cache.get_credential(false).await.expect("Second attempt should fetch.");

		assert_eq!(credential.token.expose(), "token-2");
	}

	#[tokio::test]
	async fn failed_forced_refresh_keeps_previous_credential() {
		let stub = StubExchange::with_tokens(["tok-A"]);

		stub.push(Err(invalid_client()));

		let cache = CredentialCache::new(options(), stub);

		cache.get_credential(false).await.expect("Initial fetch should succeed.");
		cache.get_credential(true).await.expect_err("Refresh failure must surface.");

		assert_eq!(
			cache.cached().map(|credential| credential.token.expose().to_owned()),
			Some("tok-A".into())
		);
	}

	#[tokio::test]
	async fn concurrent_misses_share_one_fetch() {
		let cache = CredentialCache::new(options(), StubExchange::with_tokens(["shared"]));
		let (first, second) = tokio::join!(cache.get_credential(false), cache.get_credential(false));

		assert_eq!(first.expect("First caller should succeed.").token.expose(), "shared");
		assert_eq!(second.expect("Second caller should succeed.").token.expose(), "shared");
		assert_eq!(cache.exchange().calls(), 1);
	}

	#[tokio::test]
	async fn rejected_invalidation_keeps_a_newer_credential() {
		let cache = CredentialCache::new(options(), StubExchange::with_tokens(["tok-A", "tok-B"]));
		let rejected = cache.get_credential(false).await.expect("Initial fetch should succeed.");

		cache.get_credential(true).await.expect("Forced refresh should succeed.");

		assert!(!cache.invalidate_rejected(&rejected));
		assert_eq!(
			cache.cached().map(|credential| credential.token.expose().to_owned()),
			Some("tok-B".into())
		);

		let current = cache.cached().expect("Refreshed credential should stay cached.");

		assert!(cache.invalidate_rejected(&current));
		assert!(cache.cached().is_none());
		assert!(!cache.invalidate_rejected(&current));
	}

	#[test]
	fn debug_output_hides_credentials() {
		let cache = CredentialCache::new(options(), StubExchange::default());
		let rendered = format!("{cache:?}");

		assert!(rendered.contains("cached: false"));
		assert!(!rendered.contains("secret1"));
	}
}
