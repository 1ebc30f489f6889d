//! Issuer contracts: exchange a credential for a backend [`Token`].
//!
//! The [`Issuer`] trait is the crate's only dependency on the token-minting service. Callers
//! provide an implementation (usually [`AclLoginIssuer`], behind `Arc<T>`) and the
//! [`Authenticator`](crate::authenticator::Authenticator) calls it on every cache miss. Timeouts
//! and cancellation are the implementation's responsibility; the authenticator adds no deadline
//! of its own.

#[cfg(feature = "reqwest")] pub mod acl_login;
#[cfg(feature = "reqwest")] pub use acl_login::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, Token},
};

/// Boxed future returned by [`Issuer::issue`].
pub type IssuerFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Service that mints backend tokens for identity assertions.
pub trait Issuer
where
	Self: 'static + Send + Sync,
{
	/// Exchanges `credential` for a token using the named auth method.
	///
	/// Any failure (transport, non-success status, malformed response) is reported as an
	/// [`Error`]; the caller decides how to degrade.
	fn issue<'a>(&'a self, auth_method: &'a str, credential: &'a Credential) -> IssuerFuture<'a>;
}
