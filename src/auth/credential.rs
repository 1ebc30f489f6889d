//! Identity assertion presented by an inbound request.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Raw identity assertion (e.g. a Cloudflare Access JWT) used verbatim as the cache key.
///
/// The value is never parsed. Formatting redacts it because the assertion is itself a bearer
/// credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);
impl Credential {
	/// Wraps a raw assertion string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw assertion. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl From<String> for Credential {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Credential {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Borrow<str> for Credential {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_debug_redacts() {
		let credential = Credential::new("eyJhbGciOiJSUzI1NiJ9.payload.signature");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(credential.expose(), "eyJhbGciOiJSUzI1NiJ9.payload.signature");
	}

	#[test]
	fn credential_map_can_be_queried_by_str() {
		let mut map = HashMap::new();

		map.insert(Credential::from("assertion"), 1);

		assert_eq!(map.get("assertion"), Some(&1));
		assert_eq!(map.get("other"), None);
	}
}
