//! Thread-safe credential -> token cache with expiry sweeping.
//!
//! Reads share a lock and run in parallel; [`TokenCache::store`] and
//! [`TokenCache::clear_expired`] take it exclusively. Lookups never judge expiry; that is the
//! caller's job.

pub mod sweep;

pub use sweep::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, Token},
};

/// Concurrency-safe map from credential to the most recently issued [`Token`].
#[derive(Debug, Default)]
pub struct TokenCache {
	entries: RwLock<HashMap<Credential, Token>>,
}
impl TokenCache {
	/// Capacity reserved when the first entry is stored.
	pub const INITIAL_CAPACITY: usize = 1024;

	/// Creates an empty cache. No storage is allocated until the first [`store`](Self::store).
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached token for `key`, expired or not.
	pub fn get(&self, key: &str) -> Option<Token> {
		self.entries.read().get(key).cloned()
	}

	/// Inserts or replaces the token cached for `key`.
	pub fn store(&self, key: impl Into<Credential>, token: Token) {
		let key = key.into();
		let mut guard = self.entries.write();

		if guard.capacity() == 0 {
			guard.reserve(Self::INITIAL_CAPACITY);
		}

		guard.insert(key, token);
	}

	/// Drops every entry that expired before the current UTC instant.
	///
	/// Returns the number of removed entries.
	pub fn clear_expired(&self) -> usize {
		self.clear_expired_at(OffsetDateTime::now_utc())
	}

	/// Drops every entry whose expiration time is strictly before `instant`.
	pub fn clear_expired_at(&self, instant: OffsetDateTime) -> usize {
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, token| !token.is_expired_at(instant));

		before - guard.len()
	}

	/// Number of cached entries, including expired ones not yet swept.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` if nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
