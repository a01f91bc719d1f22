//! Optional observability helpers for credential fetches and hooked requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_client_auth.auth` with the `operation` and
//!   `stage` fields, plus debug events when a credential is invalidated or a request retried.
//! - Enable `metrics` to increment the `oauth2_client_auth_total` counter, labeled by
//!   `operation` + `outcome`.
//!
//! Secrets never reach either sink.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthOperation {
	/// Credential lookup or token exchange.
	Fetch,
	/// Cache slot eviction.
	Invalidate,
	/// Request routed through the hook.
	Hook,
}
impl AuthOperation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthOperation::Fetch => "fetch",
			AuthOperation::Invalidate => "invalidate",
			AuthOperation::Hook => "hook",
		}
	}
}
impl Display for AuthOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
	/// Work started (a token exchange or a hooked request).
	Attempt,
	/// Cached credential served without a token exchange.
	Reuse,
	/// Hooked request was retried after an authorization failure.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl AuthOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthOutcome::Attempt => "attempt",
			AuthOutcome::Reuse => "reuse",
			AuthOutcome::Retry => "retry",
			AuthOutcome::Success => "success",
			AuthOutcome::Failure => "failure",
		}
	}
}
impl Display for AuthOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
