//! Optional observability helpers for the token exchange.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit a `nomad_access_broker.exchange` span around every
//!   resolve, plus debug/warn events for cache decisions, fail-open paths, and sweeps.
//! - Enable `metrics` to increment `nomad_access_broker_lookup_total` (labeled by `outcome`:
//!   hit/miss/expired) and `nomad_access_broker_exchange_total` (attempt/success/failure).
//!
//! Credentials and secrets are never recorded.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Result of consulting the token cache for a credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupOutcome {
	/// A usable token was cached.
	Hit,
	/// Nothing was cached for the credential.
	Miss,
	/// A token was cached but is past its expiration time.
	Expired,
}
impl LookupOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LookupOutcome::Hit => "hit",
			LookupOutcome::Miss => "miss",
			LookupOutcome::Expired => "expired",
		}
	}
}
impl Display for LookupOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call to the issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// The issuer is about to be called.
	Attempt,
	/// The issuer returned a token.
	Success,
	/// The issuer failed; the request will be forwarded without a token.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
