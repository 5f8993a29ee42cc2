use std::{
	collections::HashMap,
	future::Future,
	sync::{Arc, Mutex},
};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::{Error, Result};

pub type SharedRun<V> = Shared<BoxFuture<'static, Result<V>>>;

type InFlight<V> = Arc<Mutex<HashMap<String, SharedRun<V>>>>;

/// Single-flight coalescing: concurrent callers with the same key share one execution and one
/// outcome.
///
/// The run is spawned onto the runtime, so it settles even when every caller goes away. Its
/// entry is removed before the outcome is delivered, whether the run succeeded or failed.
pub struct SingleFlight<V> {
	inflight: InFlight<V>,
}
impl<V> SingleFlight<V>
where
	V: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self { inflight: Arc::new(Mutex::new(HashMap::new())) }
	}

	/// Joins the pending run for `key`, or starts `pipeline` as the run for it.
	///
	/// `pipeline` is dropped unpolled when a run is already pending.
	pub fn run<F>(&self, key: &str, pipeline: F) -> SharedRun<V>
	where
		F: Future<Output = Result<V>> + Send + 'static,
	{
		let mut inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(pending) = inflight.get(key) {
			tracing::debug!(query_key = %crate::query_fingerprint(key), "Joined in-flight run.");

			return pending.clone();
		}

		// Holding the lock here keeps the task from removing the entry before it is inserted.
		let guard = FlightGuard { inflight: self.inflight.clone(), key: key.to_string() };
		let handle = tokio::spawn(async move {
			let _guard = guard;

			pipeline.await
		});
		let shared = async move {
			match handle.await {
				Ok(outcome) => outcome,
				Err(err) => Err(Error::Internal { message: format!("Pipeline task failed: {err}.") }),
			}
		}
		.boxed()
		.shared();

		inflight.insert(key.to_string(), shared.clone());

		shared
	}

	pub fn contains(&self, key: &str) -> bool {
		self.inflight.lock().unwrap_or_else(|err| err.into_inner()).contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.inflight.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl<V> Default for SingleFlight<V>
where
	V: Clone + Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

struct FlightGuard<V> {
	inflight: InFlight<V>,
	key: String,
}
impl<V> Drop for FlightGuard<V> {
	fn drop(&mut self) {
		let mut inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());

		inflight.remove(&self.key);
	}
}
