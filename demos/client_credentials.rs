//! Demonstrates the client-credentials strategy against a mocked identity provider: the
//! accessor fetches and caches a bearer token, and the hook attaches it to API calls.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_client_auth::{
	OAuthClientAuth,
	config::{ClientAuthMethod, StrategyOptions},
	reqwest::{Client, Method, Request},
	strategy::AuthOptions,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900,\"scope\":\"orders.read\"}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let options = StrategyOptions::builder("demo-service", "demo-secret")
		.scope("orders.read")
		.client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()?;
	let auth = OAuthClientAuth::with_token_endpoint(options, Url::parse(&server.url("/oauth/token"))?)?;
	let credential = auth.auth(AuthOptions::default()).await?;

	println!("Granted scope: {} ({} token).", credential.scope, credential.token_type);

	let client = Client::new();

	for _ in 0..2 {
		let request = Request::new(Method::GET, Url::parse(&server.url("/orders"))?);
		let response = auth.hook(request, |request| client.execute(request)).await?;

		println!("Orders endpoint answered {}.", response.status());
	}

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;

	Ok(())
}
