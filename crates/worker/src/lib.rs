//! Worker primitives for the hover pipeline.
//!
//! * [`JobQueue`] / [`Dispatcher`]: FIFO work drained by one dedicated thread.
//! * [`CancellableOperation`]: cooperative cancellation for one interaction.
//! * [`GenerationClock`]: monotonic ids for document and hover lifecycles.
//! * [`spawn`]: tokio task spawning tagged with a [`TaskClass`].

mod class;
mod operation;
mod queue;
mod spawn;
mod token;

use std::any::Any;

pub use class::TaskClass;
pub use operation::CancellableOperation;
pub use queue::{DEFAULT_POLL_INTERVAL, DispatchStats, Dispatcher, Job, JobQueue, JobQueueError};
pub use spawn::{spawn, spawn_named_thread};
pub use token::GenerationClock;

/// Extracts the panic message carried by a panic payload, if it is a string.
pub fn panic_payload_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	payload.downcast_ref::<String>().cloned()
}

/// Returns the panic message of a failed task, or `None` if it was cancelled.
pub fn join_error_panic_message(err: tokio::task::JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	Some(panic_payload_message(payload.as_ref()).unwrap_or_else(|| "<non-string panic payload>".to_string()))
}

#[cfg(test)]
mod panic_tests;
