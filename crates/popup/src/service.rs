//! Top-level popup service owned by the host.

use std::sync::Arc;

use arc_swap::ArcSwap;
use glance_keywords::{AnnotationReport, KeywordIndex, LinkAnnotator, LiveDocument};
use glance_providers::{DocumentContext, Provider, ProviderRegistry};
use glance_worker::{CancellableOperation, Dispatcher, GenerationClock, JobQueue, JobQueueError, TaskClass};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::hover::{ElementId, HoverEvent, HoverTracker};
use crate::options::{OptionsError, PopupOptions};
use crate::pipeline::{ContentResolutionPipeline, Resolution};
use crate::ui::{self, PopupUi};

/// A live document shared between the host and the dispatcher thread.
pub type SharedDocument = Arc<Mutex<dyn LiveDocument + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error(transparent)]
	Options(#[from] OptionsError),

	#[error(transparent)]
	Dispatcher(#[from] JobQueueError),
}

/// Providers and keyword index applicable to one document generation.
#[derive(Debug, Default)]
pub struct ContextSnapshot {
	generation: u64,
	providers: Vec<Arc<Provider>>,
	index: KeywordIndex,
}

impl ContextSnapshot {
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Context-matched providers in registry order.
	pub fn providers(&self) -> &[Arc<Provider>] {
		&self.providers
	}

	pub fn index(&self) -> &KeywordIndex {
		&self.index
	}

	fn annotate(&self, documents: &[SharedDocument]) -> AnnotationReport {
		let mut guards: Vec<_> = documents.iter().map(|doc| doc.lock()).collect();
		LinkAnnotator::new(&self.providers, &self.index).annotate_all(guards.iter_mut().map(|guard| &mut **guard))
	}
}

/// Ties the registry, hover tracking, job dispatch and the resolution
/// pipeline together for one host.
pub struct PopupService {
	registry: Arc<ProviderRegistry>,
	options: PopupOptions,
	tracker: Mutex<HoverTracker>,
	documents: GenerationClock,
	context: ArcSwap<ContextSnapshot>,
	pipeline: Arc<ContentResolutionPipeline>,
	dispatcher: Dispatcher,
}

impl PopupService {
	/// Starts the service and its dispatcher thread.
	///
	/// The returned [`PopupUi`] must be pumped from the host's interactive thread.
	pub fn new(registry: Arc<ProviderRegistry>, options: PopupOptions) -> Result<(Self, PopupUi), ServiceError> {
		options.validate()?;
		let (ui_tx, ui) = ui::channel();
		let dispatcher = Dispatcher::start(JobQueue::new(), options.dispatcher_poll())?;
		let pipeline = Arc::new(ContentResolutionPipeline::new(&options, ui_tx));

		let service = Self {
			registry,
			options,
			tracker: Mutex::new(HoverTracker::new()),
			documents: GenerationClock::new(),
			context: ArcSwap::from_pointee(ContextSnapshot::default()),
			pipeline,
			dispatcher,
		};
		Ok((service, ui))
	}

	pub fn registry(&self) -> &Arc<ProviderRegistry> {
		&self.registry
	}

	pub fn options(&self) -> &PopupOptions {
		&self.options
	}

	/// Queue drained by the service's dispatcher thread.
	pub fn jobs(&self) -> &JobQueue {
		self.dispatcher.queue()
	}

	/// Generation of the most recent [`Self::document_changed`], or 0 before the first one.
	pub fn generation(&self) -> u64 {
		self.documents.current()
	}

	pub fn context(&self) -> Arc<ContextSnapshot> {
		self.context.load_full()
	}

	/// Switches to a new document.
	///
	/// Cancels every hover of the previous document, publishes the providers
	/// and keyword index matching `context`, and queues annotation of
	/// `documents` on the dispatcher thread. Returns the new generation.
	pub fn document_changed(&self, context: &DocumentContext, documents: Vec<SharedDocument>) -> u64 {
		self.tracker.lock().reset();

		let generation = self.documents.next();
		let providers = self.registry.snapshot().match_by_context(context);
		let index = KeywordIndex::build(&providers).unwrap_or_else(|err| {
			tracing::warn!(generation, error = %err, "keyword index unavailable");
			KeywordIndex::default()
		});
		let snapshot = Arc::new(ContextSnapshot {
			generation,
			providers,
			index,
		});
		self.context.store(Arc::clone(&snapshot));
		tracing::debug!(
			generation,
			providers = snapshot.providers.len(),
			keywords = snapshot.index.len(),
			"document.changed"
		);

		if documents.is_empty() || snapshot.index.is_empty() {
			return generation;
		}
		self.jobs().enqueue(move || {
			let report = snapshot.annotate(&documents);
			tracing::debug!(
				generation = snapshot.generation,
				documents = report.documents,
				failed = report.failed,
				linked = report.linked,
				"document.annotated"
			);
		});
		generation
	}

	/// Starts resolving a hover, superseding any hover still in flight.
	pub fn hover(&self, event: HoverEvent) -> JoinHandle<Resolution> {
		if self.options.require_ctrl_key && !event.ctrl {
			tracing::trace!(element = event.element.0, "hover ignored without ctrl");
			return glance_worker::spawn(TaskClass::Interactive, async { Resolution::Idle });
		}

		let operation = self.tracker.lock().begin(event.element);
		let candidates: Vec<_> = self.registry.snapshot().iter().cloned().collect();
		let pipeline = Arc::clone(&self.pipeline);
		glance_worker::spawn(TaskClass::Interactive, async move { pipeline.resolve(event, operation, &candidates).await })
	}

	/// Pointer left `element`; cancels its hover if it is still live.
	pub fn leave(&self, element: ElementId) -> bool {
		self.tracker.lock().leave(element)
	}

	/// Resumes an ambiguous hover with the provider the user picked.
	pub fn choose(&self, provider: &str, hover: HoverEvent, operation: CancellableOperation) -> JoinHandle<Resolution> {
		let picked = self.registry.get(provider);
		let name = provider.to_string();
		let pipeline = Arc::clone(&self.pipeline);
		glance_worker::spawn(TaskClass::Interactive, async move {
			match picked {
				Some(provider) => pipeline.fetch_and_deliver(hover, operation, provider).await,
				None => {
					tracing::debug!(provider = %name, "chosen provider is not registered");
					Resolution::Idle
				}
			}
		})
	}

	/// Cancels the live hover and stops the dispatcher after its current drain.
	pub fn shutdown(self) {
		self.tracker.lock().reset();
		self.dispatcher.shutdown();
	}
}
