// crates.io
use oauth2::{
	AuthType, ClientId as OAuthClientId, ClientSecret as OAuthClientSecret, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	config::{ClientAuthMethod, StrategyOptions},
	error::{AuthenticationError, ConfigError},
	exchange::{ExchangeFuture, TokenErrorContext, TokenExchange, TokenGrant},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

/// Client-credentials exchange performed by the `oauth2` crate over reqwest.
///
/// A fresh `oauth2` client is configured from the [`StrategyOptions`] on every exchange, so
/// one instance can serve any number of strategies pointing at the same endpoint.
#[derive(Clone)]
pub struct OAuth2Exchange {
	token_endpoint: Url,
	token_url: TokenUrl,
	http_client: ReqwestHttpClient,
}
impl OAuth2Exchange {
	/// Creates an exchange for the provided token endpoint.
	///
	/// Only `http` and `https` endpoints are accepted.
	pub fn new(token_endpoint: Url) -> Result<Self, ConfigError> {
		let invalid = || ConfigError::InvalidTokenEndpoint { url: token_endpoint.to_string() };

		if !matches!(token_endpoint.scheme(), "https" | "http") {
			return Err(invalid());
		}

		let token_url = TokenUrl::new(token_endpoint.to_string()).map_err(|_| invalid())?;

		Ok(Self { token_endpoint, token_url, http_client: ReqwestHttpClient::default() })
	}

	/// Replaces the reqwest client used for token requests.
	pub fn with_http_client(mut self, http_client: ReqwestHttpClient) -> Self {
		self.http_client = http_client;

		self
	}

	/// Token endpoint this exchange talks to.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}
}
impl TokenExchange for OAuth2Exchange {
	fn exchange<'a>(&'a self, options: &'a StrategyOptions) -> ExchangeFuture<'a> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.instrumented(meta.clone());
			let mut client = BasicClient::new(OAuthClientId::new(options.client_id.to_string()))
				.set_client_secret(OAuthClientSecret::new(
					options.client_secret.expose().to_owned(),
				))
				.set_token_uri(self.token_url.clone());

			if matches!(options.client_auth_method, ClientAuthMethod::ClientSecretPost) {
				client = client.set_auth_type(AuthType::RequestBody);
			}

			let mut request = client.exchange_client_credentials();

			for scope in options.scope.iter() {
				request = request.add_scope(Scope::new(scope.to_owned()));
			}

			let response = request
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;

			map_token_response(response)
		})
	}
}
impl Debug for OAuth2Exchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Exchange")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.finish()
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let scope = match response.scopes() {
		Some(scopes) => Some(ScopeSet::new(scopes.iter().map(|scope| scope.as_ref())).map_err(
			|err| AuthenticationError::TokenEndpoint {
				message: format!("token endpoint declared invalid scopes ({err})"),
				status: None,
				retry_after: None,
			},
		)?),
		None => None,
	};

	Ok(TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		token_type: response.token_type().as_ref().to_owned(),
		scope,
		expires_in: response.expires_in().and_then(|value| Duration::try_from(value).ok()),
	})
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response, meta).into(),
		RequestTokenError::Request(error) => map_transport_error(meta, error),
		RequestTokenError::Parse(source, _body) =>
			AuthenticationError::TokenResponseParse { source, status: meta_status(meta) }.into(),
		RequestTokenError::Other(message) => AuthenticationError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_server_response(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> AuthenticationError {
	let code = response.error().as_ref().to_owned();
	let mut ctx = TokenErrorContext::default().with_oauth_error(code.clone());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let reason = match response.error_description() {
		Some(description) => format!("{code} ({description})"),
		None => code,
	};

	ctx.classify().into_error(reason, meta_status(meta), meta_retry_after(meta))
}

fn map_transport_error(
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<ReqwestError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => AuthenticationError::Io(inner).into(),
		HttpClientError::Other(message) => AuthenticationError::TokenEndpoint {
			message: format!("HTTP client error: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => AuthenticationError::TokenEndpoint {
			message: "unknown HTTP client error".into(),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return AuthenticationError::TokenEndpoint {
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	AuthenticationError::from(err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
