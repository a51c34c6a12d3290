#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use glance_popup::{DisplayRequest, HoverEvent, PopupDisplay};
use glance_providers::{ContentFetcher, ContentFragment, FetchError, Provider, ProviderRegistry, ProviderSpec, fetch_fn};
use glance_worker::CancellableOperation;

/// Returns `<p>{url}</p>` after `delay`, counting calls.
pub fn sleeping(delay: Duration, calls: Arc<AtomicUsize>) -> Arc<dyn ContentFetcher> {
	fetch_fn(move |_, url| {
		calls.fetch_add(1, Ordering::SeqCst);
		async move {
			tokio::time::sleep(delay).await;
			Ok(ContentFragment::new(format!("<p>{url}</p>")))
		}
	})
}

pub fn quick() -> Arc<dyn ContentFetcher> {
	sleeping(Duration::from_millis(10), Arc::new(AtomicUsize::new(0)))
}

pub fn failing() -> Arc<dyn ContentFetcher> {
	fetch_fn(|_, url| async move {
		Err(FetchError::Unavailable {
			url,
			reason: "offline".into(),
		})
	})
}

pub fn registry(specs: Vec<ProviderSpec>) -> Arc<ProviderRegistry> {
	let registry = Arc::new(ProviderRegistry::new());
	for spec in specs {
		assert!(registry.register(spec));
	}
	registry
}

pub fn providers(registry: &ProviderRegistry) -> Vec<Arc<Provider>> {
	registry.snapshot().iter().cloned().collect()
}

#[derive(Default)]
pub struct Recorder {
	pub shown: Vec<DisplayRequest>,
	pub choices: Vec<(CancellableOperation, HoverEvent, Vec<String>)>,
}

impl PopupDisplay for Recorder {
	fn display(&mut self, request: DisplayRequest) {
		self.shown.push(request);
	}

	fn choose(&mut self, operation: CancellableOperation, hover: HoverEvent, candidates: Vec<Arc<Provider>>) {
		let names = candidates.iter().map(|p| p.name().to_string()).collect();
		self.choices.push((operation, hover, names));
	}
}
