//! Token endpoint error classification.
//!
//! OAuth error responses are classified by the structured `error` code first, then the
//! `error_description`, and finally the HTTP status, so providers that only send a status
//! still land in a sensible bucket.

// self
use crate::{_prelude::*, error::AuthenticationError};

/// Categories a token endpoint failure can fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
	/// Client authentication failed.
	InvalidClient,
	/// Provider rejected the grant.
	InvalidGrant,
	/// Provider refused the requested scopes.
	InvalidScope,
	/// Failure is temporary and may be retried.
	Transient,
}
impl TokenErrorKind {
	/// Builds the matching [`AuthenticationError`].
	pub fn into_error(
		self,
		reason: String,
		status: Option<u16>,
		retry_after: Option<Duration>,
	) -> AuthenticationError {
		match self {
			Self::InvalidClient => AuthenticationError::InvalidClient { reason },
			Self::InvalidGrant => AuthenticationError::InvalidGrant { reason },
			Self::InvalidScope => AuthenticationError::InvalidScope { reason },
			Self::Transient =>
				AuthenticationError::TokenEndpoint { message: reason, status, retry_after },
		}
	}
}

/// Primitive facts about a failed token request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl TokenErrorContext {
	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Classifies the failure.
	pub fn classify(&self) -> TokenErrorKind {
		self.oauth_error
			.as_deref()
			.and_then(match_error_code)
			.or_else(|| self.error_description.as_deref().and_then(match_error_code))
			.or_else(|| self.error_description.as_deref().and_then(scan_description))
			.unwrap_or_else(|| classify_status(self.http_status))
	}
}

fn match_error_code(value: &str) -> Option<TokenErrorKind> {
	const CODES: [(&str, TokenErrorKind); 7] = [
		("invalid_client", TokenErrorKind::InvalidClient),
		("unauthorized_client", TokenErrorKind::InvalidClient),
		("invalid_grant", TokenErrorKind::InvalidGrant),
		("unsupported_grant_type", TokenErrorKind::InvalidGrant),
		("invalid_scope", TokenErrorKind::InvalidScope),
		("temporarily_unavailable", TokenErrorKind::Transient),
		("server_error", TokenErrorKind::Transient),
	];

	CODES.iter().find(|(code, _)| value.eq_ignore_ascii_case(code)).map(|(_, kind)| *kind)
}

fn scan_description(description: &str) -> Option<TokenErrorKind> {
	let lowered = description.to_ascii_lowercase();

	if lowered.contains("invalid_client") || lowered.contains("bad credentials") {
		Some(TokenErrorKind::InvalidClient)
	} else if lowered.contains("invalid_grant") {
		Some(TokenErrorKind::InvalidGrant)
	} else if lowered.contains("invalid_scope") {
		Some(TokenErrorKind::InvalidScope)
	} else {
		None
	}
}

fn classify_status(status: Option<u16>) -> TokenErrorKind {
	match status {
		Some(401) => TokenErrorKind::InvalidClient,
		Some(400) => TokenErrorKind::InvalidGrant,
		Some(403) => TokenErrorKind::InvalidScope,
		_ => TokenErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_error_code_wins() {
		let ctx = TokenErrorContext::default()
			.with_http_status(400)
			.with_oauth_error("invalid_client")
			.with_error_description("invalid_scope: nope");

		assert_eq!(ctx.classify(), TokenErrorKind::InvalidClient);
		assert_eq!(
			TokenErrorContext::default().with_oauth_error("SERVER_ERROR").classify(),
			TokenErrorKind::Transient
		);
	}

	#[test]
	fn description_then_status_fallbacks() {
		let ctx = TokenErrorContext::default()
			.with_http_status(500)
			.with_error_description("Bad credentials");

		assert_eq!(ctx.classify(), TokenErrorKind::InvalidClient);
		assert_eq!(
			TokenErrorContext::default().with_http_status(401).classify(),
			TokenErrorKind::InvalidClient
		);
		assert_eq!(
			TokenErrorContext::default().with_http_status(403).classify(),
			TokenErrorKind::InvalidScope
		);
		assert_eq!(
			TokenErrorContext::default().with_http_status(503).classify(),
			TokenErrorKind::Transient
		);
		assert_eq!(TokenErrorContext::default().classify(), TokenErrorKind::Transient);
	}

	#[test]
	fn kinds_map_onto_authentication_errors() {
		let err = TokenErrorKind::Transient.into_error(
			"slow down".into(),
			Some(429),
			Some(Duration::seconds(3)),
		);

		assert!(matches!(
			err,
			AuthenticationError::TokenEndpoint { status: Some(429), retry_after: Some(_), .. }
		));
		assert!(matches!(
			TokenErrorKind::InvalidGrant.into_error("used".into(), None, None),
			AuthenticationError::InvalidGrant { .. }
		));
	}
}
