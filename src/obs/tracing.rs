// crates.io
use http::HeaderName;
// self
use crate::{_prelude::*, obs::LookupOutcome};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExchange<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExchange<F> = F;

/// A span wrapping one credential -> token resolution.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the auth method and call site.
	pub fn new(auth_method: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::debug_span!("nomad_access_broker.exchange", auth_method, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (auth_method, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExchange<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn log_lookup(outcome: LookupOutcome) {
	#[cfg(feature = "tracing")]
	tracing::debug!(outcome = outcome.as_str(), "Consulted token cache.");
	#[cfg(not(feature = "tracing"))]
	let _ = outcome;
}

pub(crate) fn log_missing_credential(header: &HeaderName) {
	#[cfg(feature = "tracing")]
	tracing::debug!(header = header.as_str(), "No assertion header found; forwarding as-is.");
	#[cfg(not(feature = "tracing"))]
	let _ = header;
}

pub(crate) fn log_issuer_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%error, "Token exchange failed; forwarding without a token.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

pub(crate) fn log_invalid_secret(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%error, "Issued token cannot be injected; forwarding without a token.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

pub(crate) fn log_sweep(removed: usize) {
	#[cfg(feature = "tracing")]
	tracing::debug!(removed, "Swept expired tokens.");
	#[cfg(not(feature = "tracing"))]
	let _ = removed;
}

pub(crate) fn log_sweep_stopped() {
	#[cfg(feature = "tracing")]
	tracing::debug!("Expiry sweep stopped.");
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = ExchangeSpan::new("cloudflare", "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn events_are_callable_without_a_subscriber() {
		log_lookup(LookupOutcome::Hit);
		log_missing_credential(&HeaderName::from_static("cf-access-jwt-assertion"));
		log_sweep(3);
		log_sweep_stopped();
	}
}
