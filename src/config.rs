//! Validated, immutable configuration bound to a client-credentials strategy.
//!
//! [`StrategyOptions`] can be assembled with [`StrategyOptions::builder`] or deserialized
//! from any serde format; both paths run the same validation so a constructed value is
//! always usable by the credential cache.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	auth::{ClientSecret, ScopeSet},
	error::ConfigError,
};

const CLIENT_ID_MAX_LEN: usize = 256;

/// Error returned when client identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Client identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Client identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Client identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// OAuth 2.0 client identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);
impl ClientId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_client_id(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ClientId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ClientId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ClientId> for String {
	fn from(value: ClientId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ClientId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_client_id(&value)?;

		Ok(Self(value))
	}
}
impl Debug for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClientId({})", self.0)
	}
}
impl Display for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ClientId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// How the client presents its identifier and secret to the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	#[default]
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}
impl ClientAuthMethod {
	/// Returns the RFC 7591 identifier for the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ClientSecretBasic => "client_secret_basic",
			Self::ClientSecretPost => "client_secret_post",
		}
	}
}
impl Display for ClientAuthMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable configuration for one client-credentials strategy.
///
/// Every field type validates itself, so a value is usable no matter how it was built.
/// An empty [`ScopeSet`] means no `scope` parameter is sent.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStrategyOptions")]
pub struct StrategyOptions {
	/// OAuth 2.0 client identifier.
	pub client_id: ClientId,
	/// Client secret; redacted in every formatter.
	pub client_secret: ClientSecret,
	/// Scopes requested with every token exchange.
	pub scope: ScopeSet,
	/// Client authentication method used against the token endpoint.
	pub client_auth_method: ClientAuthMethod,
}
impl StrategyOptions {
	/// Starts a builder for the provided client credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> StrategyOptionsBuilder {
		StrategyOptionsBuilder::new(client_id, client_secret)
	}
}

#[derive(Deserialize)]
struct RawStrategyOptions {
	client_id: String,
	client_secret: String,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	client_auth_method: ClientAuthMethod,
}
impl TryFrom<RawStrategyOptions> for StrategyOptions {
	type Error = ConfigError;

	fn try_from(raw: RawStrategyOptions) -> Result<Self, Self::Error> {
		let scope = match raw.scope.as_deref() {
			Some(value) => ScopeSet::from_str(value)?,
			None => ScopeSet::default(),
		};

		Ok(Self {
			client_id: ClientId::new(raw.client_id)?,
			client_secret: ClientSecret::new(raw.client_secret)?,
			scope,
			client_auth_method: raw.client_auth_method,
		})
	}
}

/// Builder for [`StrategyOptions`] values.
#[derive(Clone)]
pub struct StrategyOptionsBuilder {
	client_id: String,
	client_secret: String,
	scopes: Vec<String>,
	client_auth_method: ClientAuthMethod,
}
impl StrategyOptionsBuilder {
	fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scopes: Vec::new(),
			client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Requests a single scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scopes.push(scope.into());

		self
	}

	/// Requests multiple scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting options.
	pub fn build(self) -> Result<StrategyOptions, ConfigError> {
		Ok(StrategyOptions {
			client_id: ClientId::new(&self.client_id)?,
			client_secret: ClientSecret::new(self.client_secret)?,
			scope: ScopeSet::new(self.scopes)?,
			client_auth_method: self.client_auth_method,
		})
	}
}
impl Debug for StrategyOptionsBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptionsBuilder")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("scopes", &self.scopes)
			.field("client_auth_method", &self.client_auth_method)
			.finish()
	}
}

fn validate_client_id(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > CLIENT_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { max: CLIENT_ID_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_validates_every_field() {
		let options = StrategyOptions::builder("id1", "secret1")
			.scopes(["repo", "read:org"])
			.client_auth_method(ClientAuthMethod::ClientSecretPost)
			.build()
			.expect("Valid options should build.");

		assert_eq!(options.client_id.as_ref(), "id1");
		assert_eq!(options.client_secret.expose(), "secret1");
		assert_eq!(options.scope.normalized(), "read:org repo");
		assert_eq!(options.client_auth_method, ClientAuthMethod::ClientSecretPost);

		let err = StrategyOptions::builder("", "secret1")
			.build()
			.expect_err("Empty client identifiers must be rejected.");

		assert!(matches!(err, ConfigError::InvalidClientId(IdentifierError::Empty)));

		let err = StrategyOptions::builder("id1", "")
			.build()
			.expect_err("Empty client secrets must be rejected.");

		assert!(matches!(err, ConfigError::MissingClientSecret));

		let err = StrategyOptions::builder("id1", "secret1")
			.scope("two words")
			.build()
			.expect_err("Scopes with whitespace must be rejected.");

		assert!(matches!(err, ConfigError::InvalidScope(_)));
	}

	#[test]
	fn scope_is_optional() {
		let options =
			StrategyOptions::builder("id1", "secret1").build().expect("Scope should be optional.");

		assert!(options.scope.is_empty());
		assert_eq!(options.client_auth_method, ClientAuthMethod::ClientSecretBasic);
	}

	#[test]
	fn deserialization_runs_validation() {
		let options: StrategyOptions = serde_json::from_str(
			r#"{"client_id":"id1","client_secret":"secret1","scope":"email profile","client_auth_method":"client_secret_post"}"#,
		)
		.expect("Valid JSON options should deserialize.");

		assert_eq!(options.scope.normalized(), "email profile");
		assert_eq!(options.client_auth_method, ClientAuthMethod::ClientSecretPost);
		assert!(
			serde_json::from_str::<StrategyOptions>(
				r#"{"client_id":"with space","client_secret":"secret1"}"#
			)
			.is_err()
		);
		assert!(
			serde_json::from_str::<StrategyOptions>(r#"{"client_id":"id1","client_secret":""}"#)
				.is_err()
		);
	}

	#[test]
	fn debug_output_redacts_client_secret() {
		let options = StrategyOptions::builder("id1", "super-secret")
			.build()
			.expect("Valid options should build.");
		let rendered = format!("{options:?}");
		let builder = format!("{:?}", StrategyOptions::builder("id1", "super-secret"));

		assert!(!rendered.contains("super-secret"));
		assert!(!builder.contains("super-secret"));
		assert!(rendered.contains("id1"));
	}

	#[test]
	fn client_id_limits() {
		let exact = "a".repeat(CLIENT_ID_MAX_LEN);

		ClientId::new(&exact).expect("Exact length should succeed.");

		assert_eq!(
			ClientId::new("a".repeat(CLIENT_ID_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { max: CLIENT_ID_MAX_LEN })
		);
		assert!(ClientId::from_str("tab\tid").is_err());
	}
}
