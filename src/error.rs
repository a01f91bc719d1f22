//! Error taxonomy shared by the credential cache, token exchanges, and the request hook.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The token endpoint (or the path to it) refused to mint a credential.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// The hooked request failed for reasons unrelated to authorization.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns `true` when the error came from the credential fetch.
	pub fn is_authentication(&self) -> bool {
		matches!(self, Self::Authentication(_))
	}

	/// Returns `true` when retrying the same operation later may succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Authentication(e) => e.is_transient(),
			_ => false,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client identifier failed validation.
	#[error(transparent)]
	InvalidClientId(#[from] crate::config::IdentifierError),
	/// Client secret was empty.
	#[error("Client secret cannot be empty.")]
	MissingClientSecret,
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token endpoint cannot be parsed or uses an unsupported scheme.
	#[error("Token endpoint `{url}` is invalid.")]
	InvalidTokenEndpoint {
		/// Offending endpoint value.
		url: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while obtaining a credential from the token endpoint.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Client authentication failed or the credentials are unknown.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant itself.
	#[error("Provider rejected the client credentials grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider refused the requested scopes.
	#[error("Provider refused the requested scopes: {reason}.")]
	InvalidScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint returned an unexpected but possibly temporary response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// Issued token cannot be carried in an `Authorization` header.
	#[error("Issued access token is not a valid header value.")]
	MalformedToken,
}
impl AuthenticationError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` for failures that are worth retrying with backoff.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::TokenEndpoint { .. } | Self::Network { .. } | Self::Io(_))
	}

	/// HTTP status reported by the token endpoint, when known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::TokenEndpoint { status, .. } | Self::TokenResponseParse { status, .. } => *status,
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for AuthenticationError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failure returned by the dispatch function wrapped by the request hook.
///
/// The original error is kept intact; `Display` and `source` forward to it and
/// [`downcast_ref`](Self::downcast_ref) recovers the concrete type.
#[derive(Debug)]
pub struct UpstreamError(BoxError);
impl UpstreamError {
	/// Wraps a dispatch failure.
	pub fn new(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self(Box::new(src))
	}

	/// Attempts to view the dispatch failure as `E`.
	pub fn downcast_ref<E>(&self) -> Option<&E>
	where
		E: 'static + std::error::Error,
	{
		self.0.downcast_ref::<E>()
	}

	/// Returns the boxed dispatch failure.
	pub fn into_inner(self) -> BoxError {
		self.0
	}
}
impl Display for UpstreamError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl StdError for UpstreamError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.0.source()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct Refused;
	impl Display for Refused {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("connection refused")
		}
	}
	impl StdError for Refused {}

	#[test]
	fn upstream_error_forwards_display_and_downcasts() {
		let err = Error::from(UpstreamError::new(Refused));

		assert_eq!(err.to_string(), "connection refused");

		let Error::Upstream(inner) = err else {
			panic!("Dispatch failures must surface as upstream errors.");
		};

		assert!(inner.downcast_ref::<Refused>().is_some());
		assert!(inner.into_inner().downcast::<Refused>().is_ok());
	}

	#[test]
	fn transient_classification_covers_endpoint_and_network() {
		let endpoint = AuthenticationError::TokenEndpoint {
			message: "busy".into(),
			status: Some(503),
			retry_after: Some(Duration::seconds(5)),
		};

		assert!(endpoint.is_transient());
		assert_eq!(endpoint.status(), Some(503));
		assert!(AuthenticationError::network(Refused).is_transient());
		assert!(!AuthenticationError::InvalidClient { reason: "nope".into() }.is_transient());
		assert!(Error::from(endpoint).is_transient());
		assert!(!Error::from(ConfigError::MissingClientSecret).is_transient());
	}
}
