//! Broker-level error types shared by the issuer, configuration, and middleware layers.
//!
//! None of these ever reach the downstream caller: the middleware logs them and forwards the
//! request unchanged.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Upstream answered, but not with a usable token.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Issued secret cannot be carried in an HTTP header.
	#[error("Issued token secret is not a valid header value.")]
	InvalidTokenSecret(#[source] http::header::InvalidHeaderValue),
}

/// Configuration and validation failures raised while wiring the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL cannot carry a path (e.g. `mailto:` or `data:` URLs).
	#[error("Endpoint `{endpoint}` cannot be used as a base URL.")]
	EndpointCannotBeBase {
		/// Offending endpoint.
		endpoint: String,
	},
	/// Configured header name is not a valid HTTP header name.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying parsing failure.
		#[source]
		source: http::header::InvalidHeaderName,
	},
	/// Sweep interval must be positive.
	#[error("The sweep interval must be positive.")]
	InvalidSweepInterval,
	/// Login timeout must be positive.
	#[error("The request timeout must be positive.")]
	InvalidRequestTimeout,
	/// Configuration document could not be deserialized.
	#[error("Configuration JSON is invalid.")]
	InvalidJson {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The expiry sweep needs a Tokio runtime to be spawned on.
	#[error("No Tokio runtime is available to run the expiry sweep.")]
	MissingRuntime,
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

/// Upstream responded, but the response cannot be turned into a token.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Login endpoint returned a non-success status.
	#[error("Login endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Body preview or broker-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Login endpoint responded with JSON that could not be parsed into a token.
	#[error("Login endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the login endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
