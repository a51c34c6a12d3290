use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::context::DocumentContext;
use crate::error::RegistrationError;
use crate::matcher;
use crate::provider::{Provider, ProviderSpec};

/// Immutable view of the registered providers, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
	providers: IndexMap<Box<str>, Arc<Provider>>,
}

impl RegistrySnapshot {
	#[inline]
	pub fn get(&self, name: &str) -> Option<&Arc<Provider>> {
		self.providers.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<Provider>> {
		self.providers.values()
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	/// Providers whose context filter accepts `context`.
	pub fn match_by_context(&self, context: &DocumentContext) -> Vec<Arc<Provider>> {
		matcher::match_by_context(self.iter(), context)
	}

	/// Providers applicable to a hovered link.
	pub fn match_by_link(&self, url: &str, text: &str) -> Vec<Arc<Provider>> {
		matcher::match_by_link(url, text, self.iter())
	}
}

/// Registry of content providers keyed by name.
///
/// Registration is serialized; readers load the current snapshot without
/// locking and never observe a half-applied registration.
#[derive(Default)]
pub struct ProviderRegistry {
	write: Mutex<()>,
	snap: ArcSwap<RegistrySnapshot>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a provider, returning `false` (and logging why) on rejection.
	pub fn register(&self, spec: ProviderSpec) -> bool {
		match self.try_register(spec) {
			Ok(provider) => {
				tracing::info!(provider = provider.name(), "registered content provider");
				true
			}
			Err(err) => {
				tracing::warn!(error = %err, "rejected content provider registration");
				false
			}
		}
	}

	/// Registers a provider. On error nothing is changed.
	pub fn try_register(&self, spec: ProviderSpec) -> Result<Arc<Provider>, RegistrationError> {
		let provider = Arc::new(spec.compile()?);

		let _guard = self.write.lock();
		let cur = self.snap.load_full();
		if cur.providers.contains_key(provider.name()) {
			return Err(RegistrationError::Duplicate(provider.name().to_string()));
		}
		let mut next = (*cur).clone();
		next.providers.insert(provider.name().into(), Arc::clone(&provider));
		self.snap.store(Arc::new(next));
		Ok(provider)
	}

	/// Current snapshot.
	#[inline]
	pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
		self.snap.load_full()
	}

	pub fn get(&self, name: &str) -> Option<Arc<Provider>> {
		self.snap.load().get(name).cloned()
	}

	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
