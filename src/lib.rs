//! Exchange edge identity assertions for short-lived Nomad ACL tokens, cache the exchange, and
//! inject the resulting token into forwarded requests as a `tower` layer.
//!
//! The crate is organised leaves-first:
//!
//! - [`cache::TokenCache`] is the concurrency-safe credential -> token map with an expiry sweep.
//! - [`issuer::Issuer`] is the seam to the service that mints tokens; [`issuer::AclLoginIssuer`]
//!   talks to Nomad's `/v1/acl/login` over reqwest.
//! - [`authenticator::Authenticator`] decides per request whether the cached token can be reused
//!   or a fresh one must be fetched.
//! - [`middleware::AuthenticateLayer`] extracts the assertion, injects the token, and forwards the
//!   request. Every failure path forwards the request unchanged.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authenticator;
pub mod cache;
pub mod config;
pub mod error;
pub mod issuer;
pub mod middleware;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};
