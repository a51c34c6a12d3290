//! Cooperative cancellation for one hover-to-popup interaction.
//!
//! A [`CancellableOperation`] is created when a hover begins and cancelled when
//! the pointer leaves the element or a newer hover replaces it. Nothing is
//! interrupted preemptively: every suspension point of the pipeline polls
//! [`CancellableOperation::is_cancelled`] (or selects on
//! [`CancellableOperation::cancelled`]) before doing anything user-visible.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

type ReleaseCallback = Box<dyn FnOnce() + Send + 'static>;

struct OperationInner {
	generation: u64,
	cancel: CancellationToken,
	/// `None` once the release callbacks have been taken by `cancel`.
	callbacks: Mutex<Option<Vec<ReleaseCallback>>>,
}

/// One-shot cancellation handle shared by everything working on one interaction.
#[derive(Clone)]
pub struct CancellableOperation {
	inner: Arc<OperationInner>,
}

impl fmt::Debug for CancellableOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CancellableOperation")
			.field("generation", &self.inner.generation)
			.field("cancelled", &self.is_cancelled())
			.finish()
	}
}

impl CancellableOperation {
	/// Creates a live operation for the given generation.
	pub fn new(generation: u64) -> Self {
		Self {
			inner: Arc::new(OperationInner {
				generation,
				cancel: CancellationToken::new(),
				callbacks: Mutex::new(Some(Vec::new())),
			}),
		}
	}

	/// Generation this operation belongs to.
	pub fn generation(&self) -> u64 {
		self.inner.generation
	}

	/// Requests cancellation.
	///
	/// Idempotent. The first call runs every registered callback once; later or
	/// concurrent calls only observe the flag.
	pub fn cancel(&self) {
		self.inner.cancel.cancel();
		let callbacks = self.inner.callbacks.lock().take();
		if let Some(callbacks) = callbacks {
			tracing::trace!(generation = self.inner.generation, released = callbacks.len(), "operation.cancel");
			for callback in callbacks {
				callback();
			}
		}
	}

	/// Returns true once [`Self::cancel`] has been called.
	pub fn is_cancelled(&self) -> bool {
		self.inner.cancel.is_cancelled()
	}

	/// Attaches a release callback.
	///
	/// Runs the callback immediately on the calling thread if the operation is
	/// already cancelled.
	pub fn register(&self, callback: impl FnOnce() + Send + 'static) {
		let mut guard = self.inner.callbacks.lock();
		match guard.as_mut() {
			Some(callbacks) => callbacks.push(Box::new(callback)),
			None => {
				drop(guard);
				callback();
			}
		}
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.inner.cancel.cancelled().await;
	}

	/// Tokio token cancelled together with this operation.
	///
	/// Handy for providers that already plumb a `CancellationToken` through
	/// their fetch code.
	pub fn child_token(&self) -> CancellationToken {
		self.inner.cancel.child_token()
	}
}
