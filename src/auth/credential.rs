//! Bearer credential handed out by the cache.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	exchange::TokenGrant,
};

/// Grant a credential was minted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
	/// OAuth 2.0 client-credentials grant.
	ClientCredentials,
}
impl CredentialKind {
	/// Returns the RFC 6749 grant identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Bearer credential valid as of its last fetch.
///
/// Expiry is not tracked: [`expires_in`](Self::expires_in) is kept for callers that want to
/// inspect it, while the cache only drops a credential when it is invalidated.
#[derive(Clone, Debug)]
pub struct Credential {
	/// Grant the credential came from.
	pub kind: CredentialKind,
	/// Access token; callers must avoid logging it.
	pub token: TokenSecret,
	/// `token_type` reported by the token endpoint.
	pub token_type: String,
	/// Granted scopes, falling back to the requested ones when the endpoint is silent.
	pub scope: ScopeSet,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Lifetime declared by the token endpoint.
	pub expires_in: Option<Duration>,
}
impl Credential {
	/// Builds a credential from a token endpoint grant.
	pub fn from_grant(grant: TokenGrant, requested_scope: &ScopeSet) -> Self {
		Self {
			kind: CredentialKind::ClientCredentials,
			token: grant.access_token,
			token_type: grant.token_type,
			scope: grant.scope.unwrap_or_else(|| requested_scope.clone()),
			issued_at: OffsetDateTime::now_utc(),
			expires_in: grant.expires_in,
		}
	}

	/// `Authorization` header value carrying the token.
	pub fn authorization(&self) -> String {
		format!("Bearer {}", self.token.expose())
	}

	/// Expiry instant implied by [`expires_in`](Self::expires_in).
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.map(|lifetime| self.issued_at + lifetime)
	}
}
