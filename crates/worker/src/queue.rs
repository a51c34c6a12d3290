//! Single-consumer job queue drained by a dedicated dispatcher thread.
//!
//! Interactive code must never run work that synchronously calls back into
//! the interactive thread; such work is enqueued here instead and executed on
//! the dispatcher thread in submission order.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::{TaskClass, panic_payload_message, spawn_named_thread};

/// Default wait before the dispatcher re-checks its exit flag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A deferred unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Dispatcher start-up failure.
#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
	#[error("failed to spawn dispatcher thread: {0}")]
	Spawn(#[from] std::io::Error),
}

struct QueueState {
	jobs: VecDeque<Job>,
	/// Auto-reset availability signal; consumed by one wait.
	signaled: bool,
}

struct QueueShared {
	state: Mutex<QueueState>,
	available: Condvar,
	exited: AtomicBool,
	executed: AtomicU64,
	failed: AtomicU64,
}

/// Unbounded multi-producer job queue.
///
/// Cloning yields another producer handle for the same queue.
#[derive(Clone)]
pub struct JobQueue {
	shared: Arc<QueueShared>,
}

impl Default for JobQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl JobQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self {
			shared: Arc::new(QueueShared {
				state: Mutex::new(QueueState {
					jobs: VecDeque::new(),
					signaled: false,
				}),
				available: Condvar::new(),
				exited: AtomicBool::new(false),
				executed: AtomicU64::new(0),
				failed: AtomicU64::new(0),
			}),
		}
	}

	/// Appends a job and signals availability. Never blocks on the consumer.
	///
	/// Safe to call from inside a running job.
	pub fn enqueue(&self, job: impl FnOnce() + Send + 'static) {
		let mut state = self.shared.state.lock();
		state.jobs.push_back(Box::new(job));
		state.signaled = true;
		let pending = state.jobs.len();
		drop(state);
		self.shared.available.notify_one();
		tracing::trace!(pending, "jobs.enqueue");
	}

	/// Removes the oldest pending job without waiting.
	pub fn dequeue(&self) -> Option<Job> {
		self.shared.state.lock().jobs.pop_front()
	}

	/// Returns the number of pending jobs.
	pub fn len(&self) -> usize {
		self.shared.state.lock().jobs.len()
	}

	/// Returns `true` if no job is pending.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns counters for jobs run by a dispatcher of this queue.
	pub fn stats(&self) -> DispatchStats {
		DispatchStats {
			executed: self.shared.executed.load(Ordering::Acquire),
			failed: self.shared.failed.load(Ordering::Acquire),
		}
	}

	/// Waits for the availability signal, consuming it. Returns `false` on timeout.
	fn wait_available(&self, timeout: Duration) -> bool {
		let mut state = self.shared.state.lock();
		if !state.signaled {
			let _ = self.shared.available.wait_for(&mut state, timeout);
		}
		std::mem::replace(&mut state.signaled, false)
	}

	fn request_exit(&self) {
		self.shared.exited.store(true, Ordering::Release);
		let mut state = self.shared.state.lock();
		state.signaled = true;
		drop(state);
		self.shared.available.notify_all();
	}

	fn has_exited(&self) -> bool {
		self.shared.exited.load(Ordering::Acquire)
	}

	fn run(&self, job: Job) {
		match std::panic::catch_unwind(AssertUnwindSafe(job)) {
			Ok(()) => {
				self.shared.executed.fetch_add(1, Ordering::AcqRel);
			}
			Err(payload) => {
				self.shared.failed.fetch_add(1, Ordering::AcqRel);
				let msg = panic_payload_message(payload.as_ref()).unwrap_or_else(|| "<unknown panic>".to_string());
				tracing::error!(panic = %msg, "queued job panicked");
			}
		}
	}
}

/// Counters maintained by the dispatcher loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
	/// Jobs that ran to completion.
	pub executed: u64,
	/// Jobs that panicked.
	pub failed: u64,
}

/// Owner of the dispatcher thread draining a [`JobQueue`].
///
/// Dropping the dispatcher requests exit and joins the thread once its
/// current drain finishes.
pub struct Dispatcher {
	queue: JobQueue,
	thread_id: ThreadId,
	thread: Option<JoinHandle<()>>,
}

impl Dispatcher {
	/// Spawns the dispatcher thread for `queue`.
	///
	/// `poll` bounds how long the thread sleeps without traffic before it
	/// re-checks the exit flag.
	pub fn start(queue: JobQueue, poll: Duration) -> Result<Self, JobQueueError> {
		let worker = queue.clone();
		let thread = spawn_named_thread(TaskClass::Dispatcher, "glance-jobs", move || dispatch_loop(&worker, poll))?;
		let thread_id = thread.thread().id();
		tracing::debug!(poll_ms = poll.as_millis() as u64, "jobs.dispatcher.start");
		Ok(Self {
			queue,
			thread_id,
			thread: Some(thread),
		})
	}

	/// Producer handle for the drained queue.
	pub fn queue(&self) -> &JobQueue {
		&self.queue
	}

	/// Returns true when called from the dispatcher thread itself.
	pub fn is_dispatcher_thread(&self) -> bool {
		std::thread::current().id() == self.thread_id
	}

	/// Requests exit and waits for the dispatcher thread to finish.
	pub fn shutdown(mut self) {
		self.stop();
	}

	fn stop(&mut self) {
		self.queue.request_exit();
		let Some(thread) = self.thread.take() else {
			return;
		};
		if std::thread::current().id() == self.thread_id {
			// Joining ourselves would deadlock; the loop exits on its own.
			return;
		}
		if thread.join().is_err() {
			tracing::error!("job dispatcher thread panicked");
		}
	}
}

impl Drop for Dispatcher {
	fn drop(&mut self) {
		self.stop();
	}
}

fn dispatch_loop(queue: &JobQueue, poll: Duration) {
	loop {
		if queue.has_exited() {
			break;
		}
		if !queue.wait_available(poll) && queue.is_empty() {
			continue;
		}
		while let Some(job) = queue.dequeue() {
			queue.run(job);
		}
	}
	tracing::debug!(stats = ?queue.stats(), "jobs.dispatcher.exit");
}
