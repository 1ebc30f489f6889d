//! Nomad `SecretID` carried from the login response to the forwarded request.

// crates.io
use http::{HeaderValue, header::InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Secret half of a Nomad ACL token.
///
/// Formatting never prints the value, and [`TokenSecret::to_header_value`] marks the produced
/// header as sensitive so `http` keeps it out of its own `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a `SecretID` string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw `SecretID`. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Encodes the secret as a sensitive header value.
	///
	/// Fails when Nomad handed out a secret containing control characters.
	pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&self.0)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").finish_non_exhaustive()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
