#![cfg(feature = "reqwest")]

mod common;

// std
use std::{convert::Infallible, time::Duration as StdDuration};
// crates.io
use http::Request;
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tower::{Layer, ServiceExt, service_fn};
// self
use nomad_access_broker::{
	auth::Token,
	config::Config,
	issuer::AclLoginIssuer,
	middleware::AuthenticateLayer,
};

const ASSERTION: &str = "cf-access-jwt-assertion";
const TOKEN: &str = "x-nomad-token";

fn layer(server: &MockServer) -> AuthenticateLayer<AclLoginIssuer> {
	let config = Config::default()
		.with_nomad_endpoint(server.base_url())
		.with_auth_method_name("cloudflare")
		.with_sweep_interval(StdDuration::from_secs(3600));

	AuthenticateLayer::from_config_with_client(&config, common::insecure_client())
		.expect("Layer should build from a valid configuration.")
}

fn login_response(secret: &str) -> serde_json::Value {
	json!({
		"AccessorID": format!("accessor-{secret}"),
		"SecretID": secret,
		"ExpirationTime": (OffsetDateTime::now_utc() + Duration::hours(1))
			.format(&time::format_description::well_known::Rfc3339)
			.expect("Expiration fixture should format as RFC 3339."),
	})
}

/// Sends `request` through the layer and returns the token header the downstream service saw.
async fn forward(
	layer: &AuthenticateLayer<AclLoginIssuer>,
	request: Request<()>,
) -> Option<String> {
	let downstream = service_fn(|request: Request<()>| async move {
		let seen = request
			.headers()
			.get(TOKEN)
			.map(|value| value.to_str().expect("Injected token should be text.").to_owned());

		Ok::<_, Infallible>(seen)
	});

	layer.layer(downstream).oneshot(request).await.expect("Downstream service is infallible.")
}

fn request_with(assertion: Option<&str>) -> Request<()> {
	let mut builder = Request::get("http://nomad.internal/v1/jobs");

	if let Some(assertion) = assertion {
		builder = builder.header(ASSERTION, assertion);
	}

	builder.body(()).expect("Request fixture should build.")
}

#[tokio::test]
async fn request_without_assertion_is_forwarded_untouched() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).json_body(login_response("unused"));
		})
		.await;
	let layer = layer(&server);

	assert_eq!(forward(&layer, request_with(None)).await, None);
	assert_eq!(forward(&layer, request_with(Some(""))).await, None);
	assert!(layer.authenticator().cache().is_empty());

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn successful_exchange_is_cached_and_injected() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/acl/login")
				.json_body(json!({ "AuthMethodName": "cloudflare", "LoginToken": "jwt-alice" }));
			then.status(200).json_body(login_response("secret-alice"));
		})
		.await;
	let layer = layer(&server);
	let first = forward(&layer, request_with(Some("jwt-alice"))).await;
	let second = forward(&layer, request_with(Some("jwt-alice"))).await;

	assert_eq!(first.as_deref(), Some("secret-alice"));
	assert_eq!(second.as_deref(), Some("secret-alice"));

	let cached = layer
		.authenticator()
		.cache()
		.get("jwt-alice")
		.expect("Successful exchanges should be cached under the assertion.");

	assert_eq!(cached.secret_id.expose(), "secret-alice");
	assert!(cached.is_usable());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn issuer_failure_forwards_without_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(500).body("rpc error: no cluster leader");
		})
		.await;
	let layer = layer(&server);

	assert_eq!(forward(&layer, request_with(Some("jwt-bob"))).await, None);
	assert!(layer.authenticator().cache().get("jwt-bob").is_none());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_supplied_token_is_replaced_on_success_and_kept_on_failure() {
	let server = MockServer::start_async().await;
	let success = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login").body_includes("jwt-carol");
			then.status(200).json_body(login_response("secret-carol"));
		})
		.await;
	let failure = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login").body_includes("jwt-dave");
			then.status(403).body("Permission denied");
		})
		.await;
	let layer = layer(&server);
	let mut replaced = request_with(Some("jwt-carol"));
	let mut kept = request_with(Some("jwt-dave"));

	replaced.headers_mut().insert(TOKEN, "client-token".parse().expect("Fixture header value."));
	kept.headers_mut().insert(TOKEN, "client-token".parse().expect("Fixture header value."));

	assert_eq!(forward(&layer, replaced).await.as_deref(), Some("secret-carol"));
	assert_eq!(forward(&layer, kept).await.as_deref(), Some("client-token"));

	success.assert_calls_async(1).await;
	failure.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_cache_entry_is_exchanged_again() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).json_body(login_response("secret-fresh"));
		})
		.await;
	let layer = layer(&server);

	layer.authenticator().cache().store(
		"jwt-erin",
		Token::new(
			"accessor-stale",
			"secret-stale",
			OffsetDateTime::now_utc() - Duration::minutes(1),
		),
	);

	assert_eq!(
		forward(&layer, request_with(Some("jwt-erin"))).await.as_deref(),
		Some("secret-fresh")
	);
	assert_eq!(
		layer
			.authenticator()
			.cache()
			.get("jwt-erin")
			.expect("Re-issued token should replace the stale entry.")
			.secret_id
			.expose(),
		"secret-fresh"
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn secret_that_is_not_a_header_value_is_not_injected() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).json_body(login_response("line\nbreak"));
		})
		.await;
	let layer = layer(&server);

	assert_eq!(forward(&layer, request_with(Some("jwt-frank"))).await, None);

	mock.assert_calls_async(1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_the_cache() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).json_body(login_response("secret-shared"));
		})
		.await;
	let layer = layer(&server);
	let users = (0..16).map(|i| format!("jwt-user-{i}")).collect::<Vec<_>>();

	for round in 0..2 {
		let mut tasks = Vec::new();

		for user in &users {
			let layer = layer.clone();
			let request = request_with(Some(user.as_str()));

			tasks.push(tokio::spawn(async move { forward(&layer, request).await }));
		}
		for task in tasks {
			let seen = task.await.expect("Forwarding task should not panic.");

			assert_eq!(seen.as_deref(), Some("secret-shared"), "round {round}");
		}
	}

	assert_eq!(layer.authenticator().cache().len(), users.len());

	mock.assert_calls_async(users.len()).await;
}

#[tokio::test]
async fn cancelled_sweep_does_not_affect_forwarding() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/acl/login");
			then.status(200).json_body(login_response("secret-grace"));
		})
		.await;
	let layer = layer(&server);

	layer.authenticator().cancel_sweep();
	tokio::time::sleep(StdDuration::from_millis(20)).await;

	assert!(layer.authenticator().is_sweep_finished());
	assert_eq!(
		forward(&layer, request_with(Some("jwt-grace"))).await.as_deref(),
		Some("secret-grace")
	);

	mock.assert_calls_async(1).await;
}
