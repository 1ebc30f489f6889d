//! Immutable backend token model and expiry helpers.

pub mod secret;

// crates.io
use serde::{Deserializer, Serializer};
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Nomad ACL token returned by the login endpoint.
///
/// Field names on the wire follow Nomad's JSON (`AccessorID`, `SecretID`, `ExpirationTime`).
/// Tokens are never mutated; a stale token is replaced in the cache by a freshly issued one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Opaque, non-secret identifier of the token.
	#[serde(rename = "AccessorID")]
	pub accessor_id: String,
	/// Secret value injected into downstream requests; callers must avoid logging it.
	#[serde(rename = "SecretID")]
	pub secret_id: TokenSecret,
	/// Absolute UTC instant after which the token must not be reused.
	#[serde(
		rename = "ExpirationTime",
		default = "expiration::missing",
		serialize_with = "expiration::serialize",
		deserialize_with = "expiration::deserialize"
	)]
	pub expiration_time: OffsetDateTime,
}
impl Token {
	/// Builds a token from its parts.
	pub fn new(
		accessor_id: impl Into<String>,
		secret_id: impl Into<String>,
		expiration_time: OffsetDateTime,
	) -> Self {
		Self {
			accessor_id: accessor_id.into(),
			secret_id: TokenSecret::new(secret_id),
			expiration_time,
		}
	}

	/// Returns `true` if the token may still be handed out at `instant`.
	///
	/// The expiration instant itself is already unusable.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		self.expiration_time > instant
	}

	/// Convenience helper that checks usability against the current UTC instant.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the expiry sweep should drop the token at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expiration_time < instant
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("accessor_id", &self.accessor_id)
			.field("secret_id", &"<redacted>")
			.field("expiration_time", &self.expiration_time)
			.finish()
	}
}

mod expiration {
	// self
	use super::*;

	// Nomad omits or nulls the field for tokens without a TTL; those are never reused.
	pub(super) fn missing() -> OffsetDateTime {
		OffsetDateTime::UNIX_EPOCH
	}

	pub(super) fn serialize<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		time::serde::rfc3339::serialize(instant, serializer)
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(time::serde::rfc3339::option::deserialize(deserializer)?.unwrap_or_else(missing))
	}
}
