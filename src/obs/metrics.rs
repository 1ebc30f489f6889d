// self
use crate::obs::{ExchangeOutcome, LookupOutcome};

/// Records a cache lookup outcome via the global metrics recorder (when enabled).
pub fn record_lookup(outcome: LookupOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("nomad_access_broker_lookup_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records an issuer exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange(outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("nomad_access_broker_exchange_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
