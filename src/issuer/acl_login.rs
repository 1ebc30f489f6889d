//! Nomad ACL login client backed by reqwest.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{Response, StatusCode, header::CONTENT_TYPE, redirect::Policy};
// self
use crate::{
	_prelude::*,
	auth::{Credential, Token},
	config::Config,
	error::{ConfigError, TransientError, TransportError},
	issuer::{Issuer, IssuerFuture},
};

const BODY_PREVIEW_LIMIT: usize = 256;
// Enough bytes for `BODY_PREVIEW_LIMIT` characters of any UTF-8 text.
const BODY_PREVIEW_BYTES: usize = BODY_PREVIEW_LIMIT * 4;

/// Exchanges assertions for ACL tokens through Nomad's `POST /v1/acl/login`.
///
/// The request body is `{"AuthMethodName": .., "LoginToken": ..}`. Any non-2xx status is a
/// failure, and a 2xx body is parsed into a [`Token`] with its fields taken verbatim. Login
/// requests never follow redirects; configure any custom [`ReqwestClient`] the same way.
#[derive(Clone, Debug)]
pub struct AclLoginIssuer {
	client: ReqwestClient,
	login_url: Url,
}
impl AclLoginIssuer {
	/// Default per-request timeout applied by [`AclLoginIssuer::new`].
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Builds an issuer for the Nomad API rooted at `endpoint` with the default timeout.
	pub fn new(endpoint: &Url) -> Result<Self, ConfigError> {
		Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
	}

	/// Builds an issuer whose login calls give up after `timeout`.
	pub fn with_timeout(endpoint: &Url, timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).timeout(timeout).build()?;

		Self::with_client(endpoint, client)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(endpoint: &Url, client: ReqwestClient) -> Result<Self, ConfigError> {
		Ok(Self { client, login_url: login_url(endpoint)? })
	}

	/// Builds an issuer from the endpoint and timeout in `config`.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		Self::with_timeout(&config.nomad_endpoint()?, config.request_timeout())
	}

	/// Builds an issuer for the endpoint in `config` over an existing client.
	///
	/// The client's own timeout and redirect policy apply instead of `config.request_timeout()`.
	pub fn from_config_with_client(
		config: &Config,
		client: ReqwestClient,
	) -> Result<Self, ConfigError> {
		Self::with_client(&config.nomad_endpoint()?, client)
	}

	/// Fully resolved login URL.
	pub fn login_url(&self) -> &Url {
		&self.login_url
	}

	async fn login(&self, auth_method: &str, credential: &Credential) -> Result<Token> {
		let payload = serde_json::json!({
			"AuthMethodName": auth_method,
			"LoginToken": credential.expose(),
		});
		let response = self
			.client
			.post(self.login_url.clone())
			.header(CONTENT_TYPE, "application/json")
			.body(payload.to_string())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			let (prefix, truncated) =
				read_prefix(response, BODY_PREVIEW_BYTES).await.map_err(TransportError::from)?;

			return Err(TransientError::TokenEndpoint {
				message: body_preview(status, &prefix, truncated),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let body = response.bytes().await.map_err(TransportError::from)?;
		let mut deserializer = serde_json::Deserializer::from_slice(&body);
		let token = serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::TokenResponseParse { source, status: Some(status.as_u16()) }
		})?;

		Ok(token)
	}
}
impl Issuer for AclLoginIssuer {
	fn issue<'a>(&'a self, auth_method: &'a str, credential: &'a Credential) -> IssuerFuture<'a> {
		Box::pin(self.login(auth_method, credential))
	}
}

/// Appends `v1/acl/login` to `endpoint`, keeping any path prefix it already carries.
pub fn login_url(endpoint: &Url) -> Result<Url, ConfigError> {
	let mut url = endpoint.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::EndpointCannotBeBase { endpoint: endpoint.to_string() })?
		.pop_if_empty()
		.extend(["v1", "acl", "login"]);

	Ok(url)
}

/// Reads at most `limit` body bytes, reporting whether anything was left unread.
async fn read_prefix(
	mut response: Response,
	limit: usize,
) -> Result<(Vec<u8>, bool), ReqwestError> {
	let mut prefix = Vec::new();

	while let Some(chunk) = response.chunk().await? {
		let room = limit - prefix.len();

		if chunk.len() > room {
			prefix.extend_from_slice(&chunk[..room]);

			return Ok((prefix, true));
		}

		prefix.extend_from_slice(&chunk);
	}

	Ok((prefix, false))
}

fn body_preview(status: StatusCode, body: &[u8], truncated: bool) -> String {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() {
		return format!("HTTP {status}");
	}

	let mut preview = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	if truncated || text.chars().count() > BODY_PREVIEW_LIMIT {
		preview.push_str("...");
	}

	format!("HTTP {status}: {preview}")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Endpoint fixture should parse.")
	}

	#[test]
	fn login_url_appends_api_path() {
		assert_eq!(
			login_url(&url("http://localhost:4646"))
				.expect("Plain endpoints should accept the login path.")
				.as_str(),
			"http://localhost:4646/v1/acl/login"
		);
		assert_eq!(
			login_url(&url("https://nomad.example.com/proxy/"))
				.expect("Endpoints with a trailing slash should keep their prefix.")
				.as_str(),
			"https://nomad.example.com/proxy/v1/acl/login"
		);
		assert_eq!(
			login_url(&url("https://nomad.example.com/proxy"))
				.expect("Endpoints without a trailing slash should keep their prefix.")
				.as_str(),
			"https://nomad.example.com/proxy/v1/acl/login"
		);
	}

	#[test]
	fn login_url_rejects_cannot_be_base_endpoints() {
		let err = login_url(&url("mailto:ops@example.com"))
			.expect_err("Endpoints without a path should be rejected.");

		assert!(matches!(err, ConfigError::EndpointCannotBeBase { .. }));
	}

	fn error_response(body: impl Into<reqwest::Body>) -> Response {
		Response::from(
			http::Response::builder()
				.status(503)
				.body(body)
				.expect("Response fixture should build."),
		)
	}

	#[test]
	fn body_preview_is_bounded() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT * 2);
		let preview = body_preview(StatusCode::BAD_REQUEST, long.as_bytes(), false);

		assert!(preview.starts_with("HTTP 400 Bad Request: "));
		assert!(preview.ends_with("..."));
		assert_eq!(body_preview(StatusCode::BAD_GATEWAY, b"  ", false), "HTTP 502 Bad Gateway");
		assert_eq!(
			body_preview(StatusCode::BAD_GATEWAY, b"short", true),
			"HTTP 502 Bad Gateway: short..."
		);
	}

	#[tokio::test]
	async fn read_prefix_stops_at_the_limit() {
		let page = "<html>".repeat(10_000);
		let (prefix, truncated) = read_prefix(error_response(page), BODY_PREVIEW_BYTES)
			.await
			.expect("In-memory bodies should be readable.");

		assert_eq!(prefix.len(), BODY_PREVIEW_BYTES);
		assert!(truncated);
	}

	#[tokio::test]
	async fn read_prefix_keeps_short_bodies_whole() {
		let (prefix, truncated) =
			read_prefix(error_response("no cluster leader"), BODY_PREVIEW_BYTES)
				.await
				.expect("In-memory bodies should be readable.");

		assert_eq!(prefix, b"no cluster leader");
		assert!(!truncated);
	}
}
