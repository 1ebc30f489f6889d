//! Demonstrates the broker layer in front of a stand-in Nomad API: the first request exchanges
//! its Cloudflare Access assertion for an ACL token, the second reuses the cached token.

// std
use std::convert::Infallible;
// crates.io
use color_eyre::Result;
use http::Request;
use httpmock::prelude::*;
use tower::{Layer, ServiceExt, service_fn};
use tracing_subscriber::EnvFilter;
// self
use nomad_access_broker::{
	config::Config,
	middleware::AuthenticateLayer,
	reqwest::{Client, redirect::Policy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("nomad_access_broker=debug")),
		)
		.init();

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).header("content-type", "application/json").body(
				"{\"AccessorID\":\"demo-accessor\",\"SecretID\":\"demo-secret\",\
				 \"ExpirationTime\":\"2099-01-01T00:00:00Z\"}",
			);
		})
		.await;
	let config = Config::from_json_str(&format!(
		r#"{{"nomadEndpoint":"{}","authMethodName":"cloudflare"}}"#,
		server.base_url()
	))?;
	// The mock serves a self-signed certificate.
	let client = Client::builder()
		.redirect(Policy::none())
		.timeout(config.request_timeout())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let layer = AuthenticateLayer::from_config_with_client(&config, client)?;
	let downstream = service_fn(|request: Request<()>| async move {
		let token = request
			.headers()
			.get(Config::DEFAULT_TOKEN_HEADER)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);

		Ok::<_, Infallible>(token)
	});

	for attempt in 1..=2 {
		let request = Request::get("http://nomad.internal/v1/jobs")
			.header(Config::DEFAULT_ASSERTION_HEADER, "demo.cf-access.jwt")
			.body(())?;
		let token = layer.layer(downstream.clone()).oneshot(request).await?;

		println!("Request {attempt} reached Nomad with token: {token:?}.");
	}

	login_mock.assert_calls_async(1).await;
	layer.authenticator().cancel_sweep();

	Ok(())
}
