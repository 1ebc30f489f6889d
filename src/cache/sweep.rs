//! Background expiry sweep for a shared [`TokenCache`].
//!
//! The sweep only bounds memory; request handling re-validates expiry on every lookup, so a
//! late or stopped sweep never hands out an expired token.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	runtime::Handle,
	sync::watch,
	task::JoinHandle,
	time::{MissedTickBehavior, interval},
};
// self
use crate::{_prelude::*, cache::TokenCache, error::ConfigError, obs};

/// Handle to a running expiry sweep.
///
/// Dropping the handle stops the sweep at its next wake-up.
#[derive(Debug)]
pub struct SweepHandle {
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}
impl SweepHandle {
	/// Signals the sweep loop to stop without waiting for it.
	pub fn cancel(&self) {
		self.shutdown.send_replace(true);
	}

	/// Returns `true` once the sweep loop has exited.
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Stops the sweep loop and waits until it has exited.
	pub async fn shutdown(self) {
		self.cancel();

		// The loop never panics; a join error can only mean the runtime is shutting down.
		let _ = self.task.await;
	}
}

/// Spawns a task on the current Tokio runtime that calls [`TokenCache::clear_expired`] every
/// `interval`.
pub fn spawn_sweeper(
	cache: Arc<TokenCache>,
	interval: StdDuration,
) -> Result<SweepHandle, ConfigError> {
	if interval.is_zero() {
		return Err(ConfigError::InvalidSweepInterval);
	}

	let runtime = Handle::try_current().map_err(|_| ConfigError::MissingRuntime)?;
	let (shutdown, signal) = watch::channel(false);
	let task = runtime.spawn(run(cache, interval, signal));

	Ok(SweepHandle { shutdown, task })
}

async fn run(cache: Arc<TokenCache>, period: StdDuration, mut signal: watch::Receiver<bool>) {
	let mut ticker = interval(period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// The first tick completes immediately; the first sweep happens one interval in.
	ticker.tick().await;

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				let removed = cache.clear_expired();

				obs::log_sweep(removed);
			},
			// Only `true` is ever sent, and a closed channel means every handle is gone.
			_ = signal.changed() => break,
		}
	}

	obs::log_sweep_stopped();
}
