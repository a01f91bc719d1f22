//! Secret wrappers that keep sensitive material out of logs and error messages.

// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted bearer token issued by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Redacted OAuth client secret.
///
/// Deserializable so it can be loaded with the rest of the configuration, but never
/// serializable.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ClientSecret(String);
impl ClientSecret {
	/// Wraps a client secret, rejecting empty values.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		if value.is_empty() {
			return Err(ConfigError::MissingClientSecret);
		}

		Ok(Self(value))
	}

	/// Returns the inner secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for ClientSecret {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for ClientSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ClientSecret").field(&"<redacted>").finish()
	}
}
impl Display for ClientSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let token = TokenSecret::new("tok-A");
		let client = ClientSecret::new("secret1").expect("Non-empty secret should be accepted.");

		assert_eq!(format!("{token:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
		assert_eq!(format!("{client:?}"), "ClientSecret(\"<redacted>\")");
		assert_eq!(format!("{client}"), "<redacted>");
		assert_eq!(token.expose(), "tok-A");
		assert_eq!(client.expose(), "secret1");
	}

	#[test]
	fn empty_client_secret_is_rejected() {
		assert!(matches!(ClientSecret::new(""), Err(ConfigError::MissingClientSecret)));
	}
}
