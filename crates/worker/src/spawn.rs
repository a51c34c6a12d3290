use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

use crate::TaskClass;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("glance-worker-global")
			.build()
			.expect("failed to build glance-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns an async task tagged with a worker class.
///
/// Falls back to a small process-wide runtime when called from a thread that
/// is not inside a tokio context (for example the host's UI thread).
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Spawns a dedicated named OS thread tagged with a worker class.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_named_thread");
	std::thread::Builder::new().name(name.into()).spawn(f)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn spawn_outside_runtime_uses_global_runtime() {
		let handle = spawn(TaskClass::Background, async { 21 * 2 });
		let value = runtime_handle().block_on(handle).unwrap();
		assert_eq!(value, 42);
	}

	#[test]
	fn named_thread_carries_name() {
		let handle = spawn_named_thread(TaskClass::Dispatcher, "glance-test-thread", || std::thread::current().name().map(str::to_owned)).unwrap();
		assert_eq!(handle.join().unwrap().as_deref(), Some("glance-test-thread"));
	}
}
