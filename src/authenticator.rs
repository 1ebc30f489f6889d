//! Cache-aside decision policy: reuse a cached token or exchange the credential for a new one.
//!
//! A cached token is reused only while its expiration time is strictly after the current UTC
//! instant. Anything else (no entry, expired entry) calls the [`Issuer`] and stores the result.
//! No cross-request lock guards the miss path, so concurrent requests presenting the same
//! uncached credential each call the issuer and the last store wins.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Token},
	cache::{SweepHandle, TokenCache, spawn_sweeper},
	error::ConfigError,
	issuer::Issuer,
	obs::{self, ExchangeOutcome, ExchangeSpan, LookupOutcome},
};
#[cfg(feature = "reqwest")]
use crate::{config::Config, issuer::AclLoginIssuer};

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's Nomad ACL login issuer.
pub type NomadAuthenticator = Authenticator<AclLoginIssuer>;

/// Resolves credentials to backend tokens, using the cache as the fast path.
///
/// Constructing an authenticator starts the expiry sweep for its cache. The sweep runs until
/// [`Authenticator::cancel_sweep`] is called or the last clone is dropped.
pub struct Authenticator<I>
where
	I: ?Sized + Issuer,
{
	cache: Arc<TokenCache>,
	issuer: Arc<I>,
	auth_method: Arc<str>,
	sweeper: Arc<SweepHandle>,
}
impl<I> Authenticator<I>
where
	I: ?Sized + Issuer,
{
	/// Creates an authenticator over a shared cache and spawns its expiry sweep on the current
	/// Tokio runtime.
	pub fn new(
		cache: Arc<TokenCache>,
		issuer: impl Into<Arc<I>>,
		auth_method: impl Into<String>,
		sweep_interval: StdDuration,
	) -> Result<Self, ConfigError> {
		let sweeper = spawn_sweeper(Arc::clone(&cache), sweep_interval)?;

		Ok(Self {
			cache,
			issuer: issuer.into(),
			auth_method: Arc::from(auth_method.into()),
			sweeper: Arc::new(sweeper),
		})
	}

	/// Returns a token for `credential`, from the cache when it is still usable and from the
	/// issuer otherwise.
	///
	/// Freshly issued tokens are stored before being returned. Issuer failures are returned
	/// as-is and leave the cache untouched.
	pub async fn resolve(&self, credential: &Credential) -> Result<Token> {
		let span = ExchangeSpan::new(&self.auth_method, "resolve");

		span.instrument(async move {
			let lookup = match self.cache.get(credential.expose()) {
				Some(token) if token.is_usable_at(OffsetDateTime::now_utc()) => {
					note_lookup(LookupOutcome::Hit);

					return Ok(token);
				},
				Some(_) => LookupOutcome::Expired,
				None => LookupOutcome::Miss,
			};

			note_lookup(lookup);
			obs::record_exchange(ExchangeOutcome::Attempt);

			match self.issuer.issue(&self.auth_method, credential).await {
				Ok(token) => {
					self.cache.store(credential.clone(), token.clone());
					obs::record_exchange(ExchangeOutcome::Success);

					Ok(token)
				},
				Err(e) => {
					obs::record_exchange(ExchangeOutcome::Failure);

					Err(e)
				},
			}
		})
		.await
	}

	/// Shared token cache.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Issuer called on cache misses.
	pub fn issuer(&self) -> &Arc<I> {
		&self.issuer
	}

	/// Auth method passed to the issuer.
	pub fn auth_method(&self) -> &str {
		&self.auth_method
	}

	/// Stops the expiry sweep for every clone of this authenticator.
	pub fn cancel_sweep(&self) {
		self.sweeper.cancel();
	}

	/// Returns `true` once the expiry sweep has exited.
	pub fn is_sweep_finished(&self) -> bool {
		self.sweeper.is_finished()
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<AclLoginIssuer> {
	/// Validates `config`, then wires a fresh cache, a Nomad login issuer, and the sweep.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		config.validate()?;

		Self::with_issuer(config, AclLoginIssuer::from_config(config)?)
	}

	/// Same as [`Authenticator::from_config`], but logs in through `client`.
	pub fn from_config_with_client(
		config: &Config,
		client: ReqwestClient,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		Self::with_issuer(config, AclLoginIssuer::from_config_with_client(config, client)?)
	}

	fn with_issuer(config: &Config, issuer: AclLoginIssuer) -> Result<Self, ConfigError> {
		Self::new(
			Arc::new(TokenCache::new()),
			issuer,
			config.auth_method_name.clone(),
			config.sweep_interval(),
		)
	}
}
impl<I> Clone for Authenticator<I>
where
	I: ?Sized + Issuer,
{
	fn clone(&self) -> Self {
		Self {
			cache: Arc::clone(&self.cache),
			issuer: Arc::clone(&self.issuer),
			auth_method: Arc::clone(&self.auth_method),
			sweeper: Arc::clone(&self.sweeper),
		}
	}
}
impl<I> Debug for Authenticator<I>
where
	I: ?Sized + Issuer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("auth_method", &self.auth_method)
			.field("cached", &self.cache.len())
			.field("sweep_finished", &self.sweeper.is_finished())
			.finish()
	}
}

fn note_lookup(outcome: LookupOutcome) {
	obs::record_lookup(outcome);
	obs::log_lookup(outcome);
}
