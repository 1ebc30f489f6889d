//! Broker configuration, loadable from the same JSON shape the edge proxy hands to plugins.
//!
//! Every field has a default, so `{}` is a valid document. Values are validated lazily by the
//! accessors and eagerly by [`Config::validate`].

// std
use std::time::Duration as StdDuration;
// crates.io
use http::HeaderName;
// self
use crate::{_prelude::*, error::ConfigError};

/// Settings for the issuer, the header names, and the expiry sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	/// Base URL of the Nomad HTTP API.
	pub nomad_endpoint: String,
	/// Nomad auth method used for the login; empty lets the server pick its default method.
	pub auth_method_name: String,
	/// Request header carrying the identity assertion.
	pub assertion_header: String,
	/// Request header the issued secret is injected into.
	pub token_header: String,
	/// Seconds between two expiry sweeps.
	pub sweep_interval_secs: u64,
	/// Seconds a single login call may take before it is abandoned.
	pub request_timeout_secs: u64,
}
impl Config {
	/// Default Nomad API address.
	pub const DEFAULT_NOMAD_ENDPOINT: &'static str = "http://localhost:4646";
	/// Default assertion header (Cloudflare Access).
	pub const DEFAULT_ASSERTION_HEADER: &'static str = "Cf-Access-Jwt-Assertion";
	/// Default token header (Nomad).
	pub const DEFAULT_TOKEN_HEADER: &'static str = "X-Nomad-Token";
	/// Default sweep interval in seconds.
	pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
	/// Default login timeout in seconds.
	pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

	/// Parses a JSON document, reporting the path of the offending field on failure.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidJson { source })
	}

	/// Overrides the Nomad API address.
	pub fn with_nomad_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.nomad_endpoint = endpoint.into();

		self
	}

	/// Overrides the Nomad auth method.
	pub fn with_auth_method_name(mut self, name: impl Into<String>) -> Self {
		self.auth_method_name = name.into();

		self
	}

	/// Overrides the assertion header name.
	pub fn with_assertion_header(mut self, name: impl Into<String>) -> Self {
		self.assertion_header = name.into();

		self
	}

	/// Overrides the token header name.
	pub fn with_token_header(mut self, name: impl Into<String>) -> Self {
		self.token_header = name.into();

		self
	}

	/// Overrides the sweep interval (whole seconds).
	pub fn with_sweep_interval(mut self, interval: StdDuration) -> Self {
		self.sweep_interval_secs = interval.as_secs();

		self
	}

	/// Overrides the login timeout (whole seconds).
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout_secs = timeout.as_secs();

		self
	}

	/// Parsed Nomad API address.
	pub fn nomad_endpoint(&self) -> Result<Url, ConfigError> {
		let url = Url::parse(&self.nomad_endpoint)
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::EndpointCannotBeBase { endpoint: self.nomad_endpoint.clone() });
		}

		Ok(url)
	}

	/// Parsed assertion header name.
	pub fn assertion_header_name(&self) -> Result<HeaderName, ConfigError> {
		header_name(&self.assertion_header)
	}

	/// Parsed token header name.
	pub fn token_header_name(&self) -> Result<HeaderName, ConfigError> {
		header_name(&self.token_header)
	}

	/// Interval between expiry sweeps.
	pub fn sweep_interval(&self) -> StdDuration {
		StdDuration::from_secs(self.sweep_interval_secs)
	}

	/// Timeout applied to each login call.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.request_timeout_secs)
	}

	/// Checks every field at once.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.nomad_endpoint()?;
		self.assertion_header_name()?;
		self.token_header_name()?;

		if self.sweep_interval_secs == 0 {
			return Err(ConfigError::InvalidSweepInterval);
		}
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::InvalidRequestTimeout);
		}

		Ok(())
	}
}
impl Default for Config {
	fn default() -> Self {
		Self {
			nomad_endpoint: Self::DEFAULT_NOMAD_ENDPOINT.into(),
			auth_method_name: String::new(),
			assertion_header: Self::DEFAULT_ASSERTION_HEADER.into(),
			token_header: Self::DEFAULT_TOKEN_HEADER.into(),
			sweep_interval_secs: Self::DEFAULT_SWEEP_INTERVAL_SECS,
			request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
}

fn header_name(name: &str) -> Result<HeaderName, ConfigError> {
	HeaderName::from_bytes(name.as_bytes())
		.map_err(|source| ConfigError::InvalidHeaderName { name: name.to_owned(), source })
}
