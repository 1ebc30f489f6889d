//! `tower` middleware that swaps the edge assertion for a backend token before forwarding.
//!
//! [`AuthenticateLayer`] wraps any `Service<http::Request<B>>`. For each request the wrapped
//! service:
//!
//! 1. reads the assertion header; when it is absent, empty, or not valid UTF-8 the request is
//!    forwarded untouched and no issuer call is made;
//! 2. resolves the assertion through the [`Authenticator`];
//! 3. on success, sets the token header to the token's secret (replacing any value the client
//!    sent);
//! 4. forwards the request.
//!
//! Failures in steps 2 and 3 are logged and the request is forwarded without the token header.
//! The middleware never answers a request by itself, so its error type is the inner service's.

// std
use std::task::{Context, Poll};
// crates.io
use http::{HeaderMap, HeaderName, Request};
use tower::{Layer, Service};
// self
use crate::{_prelude::*, auth::Credential, authenticator::Authenticator, issuer::Issuer, obs};
#[cfg(feature = "reqwest")]
use crate::{config::Config, error::ConfigError, issuer::AclLoginIssuer};

/// Default assertion header (Cloudflare Access), in canonical lowercase form.
pub const DEFAULT_ASSERTION_HEADER: &str = "cf-access-jwt-assertion";
/// Default token header (Nomad), in canonical lowercase form.
pub const DEFAULT_TOKEN_HEADER: &str = "x-nomad-token";

/// Boxed future returned by [`AuthenticateService`].
pub type AuthenticateFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Layer producing [`AuthenticateService`]s that share one [`Authenticator`].
pub struct AuthenticateLayer<I>
where
	I: ?Sized + Issuer,
{
	authenticator: Authenticator<I>,
	assertion_header: HeaderName,
	token_header: HeaderName,
}
impl<I> AuthenticateLayer<I>
where
	I: ?Sized + Issuer,
{
	/// Wraps `authenticator` using the default header names.
	pub fn new(authenticator: Authenticator<I>) -> Self {
		Self {
			authenticator,
			assertion_header: HeaderName::from_static(DEFAULT_ASSERTION_HEADER),
			token_header: HeaderName::from_static(DEFAULT_TOKEN_HEADER),
		}
	}

	/// Reads the credential from `name` instead of the default assertion header.
	pub fn with_assertion_header(mut self, name: HeaderName) -> Self {
		self.assertion_header = name;

		self
	}

	/// Writes the token secret into `name` instead of the default token header.
	pub fn with_token_header(mut self, name: HeaderName) -> Self {
		self.token_header = name;

		self
	}

	/// Authenticator shared by every service built from this layer.
	pub fn authenticator(&self) -> &Authenticator<I> {
		&self.authenticator
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticateLayer<AclLoginIssuer> {
	/// Builds the whole stack (cache, sweep, Nomad issuer, header names) from `config`.
	///
	/// Must be called inside a Tokio runtime.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		Self::with_headers(Authenticator::from_config(config)?, config)
	}

	/// Same as [`AuthenticateLayer::from_config`], but logs in through `client`.
	pub fn from_config_with_client(
		config: &Config,
		client: ReqwestClient,
	) -> Result<Self, ConfigError> {
		Self::with_headers(Authenticator::from_config_with_client(config, client)?, config)
	}

	fn with_headers(
		authenticator: Authenticator<AclLoginIssuer>,
		config: &Config,
	) -> Result<Self, ConfigError> {
		Ok(Self::new(authenticator)
			.with_assertion_header(config.assertion_header_name()?)
			.with_token_header(config.token_header_name()?))
	}
}
impl<I> Clone for AuthenticateLayer<I>
where
	I: ?Sized + Issuer,
{
	fn clone(&self) -> Self {
		Self {
			authenticator: self.authenticator.clone(),
			assertion_header: self.assertion_header.clone(),
			token_header: self.token_header.clone(),
		}
	}
}
impl<I> Debug for AuthenticateLayer<I>
where
	I: ?Sized + Issuer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticateLayer")
			.field("authenticator", &self.authenticator)
			.field("assertion_header", &self.assertion_header)
			.field("token_header", &self.token_header)
			.finish()
	}
}
impl<S, I> Layer<S> for AuthenticateLayer<I>
where
	I: ?Sized + Issuer,
{
	type Service = AuthenticateService<S, I>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthenticateService {
			inner,
			injector: Arc::new(Injector {
				authenticator: self.authenticator.clone(),
				assertion_header: self.assertion_header.clone(),
				token_header: self.token_header.clone(),
			}),
		}
	}
}

/// Service that injects a backend token into each request before calling `inner`.
pub struct AuthenticateService<S, I>
where
	I: ?Sized + Issuer,
{
	inner: S,
	injector: Arc<Injector<I>>,
}
impl<S, I> AuthenticateService<S, I>
where
	I: ?Sized + Issuer,
{
	/// Wrapped service.
	pub fn get_ref(&self) -> &S {
		&self.inner
	}

	/// Authenticator resolving tokens for this service.
	pub fn authenticator(&self) -> &Authenticator<I> {
		&self.injector.authenticator
	}
}
impl<S, I> Clone for AuthenticateService<S, I>
where
	S: Clone,
	I: ?Sized + Issuer,
{
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone(), injector: Arc::clone(&self.injector) }
	}
}
impl<S, I> Debug for AuthenticateService<S, I>
where
	S: Debug,
	I: ?Sized + Issuer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticateService")
			.field("inner", &self.inner)
			.field("assertion_header", &self.injector.assertion_header)
			.field("token_header", &self.injector.token_header)
			.finish()
	}
}
impl<S, I, B> Service<Request<B>> for AuthenticateService<S, I>
where
	S: 'static + Send + Clone + Service<Request<B>>,
	S::Future: Send,
	I: ?Sized + Issuer,
	B: 'static + Send,
{
	type Error = S::Error;
	type Future = AuthenticateFuture<S::Response, S::Error>;
	type Response = S::Response;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut request: Request<B>) -> Self::Future {
		// Keep the instance that was driven to readiness and leave a fresh clone in its place.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		let injector = Arc::clone(&self.injector);

		Box::pin(async move {
			injector.inject(&mut request).await;

			inner.call(request).await
		})
	}
}

struct Injector<I>
where
	I: ?Sized + Issuer,
{
	authenticator: Authenticator<I>,
	assertion_header: HeaderName,
	token_header: HeaderName,
}
impl<I> Injector<I>
where
	I: ?Sized + Issuer,
{
	async fn inject<B>(&self, request: &mut Request<B>) {
		let Some(credential) = credential(request.headers(), &self.assertion_header) else {
			obs::log_missing_credential(&self.assertion_header);

			return;
		};
		let token = match self.authenticator.resolve(&credential).await {
			Ok(token) => token,
			Err(e) => {
				obs::log_issuer_failure(&e);

				return;
			},
		};

		match token.secret_id.to_header_value() {
			Ok(value) => {
				request.headers_mut().insert(self.token_header.clone(), value);
			},
			Err(e) => obs::log_invalid_secret(&Error::InvalidTokenSecret(e)),
		}
	}
}

/// Reads the first `name` header as a credential.
///
/// Any non-empty UTF-8 value is taken verbatim, including non-ASCII `obs-text`; empty values and
/// byte sequences that are not UTF-8 count as absent.
fn credential(headers: &HeaderMap, name: &HeaderName) -> Option<Credential> {
	let value = std::str::from_utf8(headers.get(name)?.as_bytes()).ok()?;

	if value.is_empty() {
		return None;
	}

	Some(Credential::new(value))
}
