//! Hover content resolution: match, fetch, normalize latency, deliver.
//!
//! Every suspension point re-checks the hover's [`CancellableOperation`];
//! a cancelled hover ends silently and anything it produced is discarded.
//! The fetch runs as its own task so a panicking provider surfaces as a join
//! error instead of tearing down the pipeline.

use std::sync::Arc;
use std::time::Duration;

use glance_providers::{Provider, match_by_link};
use glance_worker::{CancellableOperation, TaskClass, join_error_panic_message};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::hover::HoverEvent;
use crate::options::PopupOptions;
use crate::ui::{DisplayRequest, PopupUiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Idle,
	Matching,
	Fetching,
	LatencyNormalizing,
	Delivering,
	Displayed,
	Cancelled,
	Failed,
}

impl Stage {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Matching => "matching",
			Self::Fetching => "fetching",
			Self::LatencyNormalizing => "latency_normalizing",
			Self::Delivering => "delivering",
			Self::Displayed => "displayed",
			Self::Cancelled => "cancelled",
			Self::Failed => "failed",
		}
	}
}

/// How a hover ended.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// No provider applies.
	Idle,
	/// Several providers apply; a `Choose` event was posted.
	Ambiguous(Vec<Arc<Provider>>),
	/// Content was posted to the UI channel.
	Delivered,
	Cancelled,
	Failed,
}

impl Resolution {
	/// Terminal stage reached.
	pub fn stage(&self) -> Stage {
		match self {
			Self::Idle => Stage::Idle,
			Self::Ambiguous(_) => Stage::Matching,
			Self::Delivered => Stage::Displayed,
			Self::Cancelled => Stage::Cancelled,
			Self::Failed => Stage::Failed,
		}
	}
}

fn enter(generation: u64, stage: Stage) {
	tracing::trace!(generation, stage = stage.as_str(), "pipeline.stage");
}

fn cancelled(generation: u64) -> Resolution {
	enter(generation, Stage::Cancelled);
	Resolution::Cancelled
}

fn failed(generation: u64) -> Resolution {
	enter(generation, Stage::Failed);
	Resolution::Failed
}

pub struct ContentResolutionPipeline {
	latency_floor: Duration,
	default_priority: f64,
	ui_tx: mpsc::UnboundedSender<PopupUiEvent>,
}

impl ContentResolutionPipeline {
	pub fn new(options: &PopupOptions, ui_tx: mpsc::UnboundedSender<PopupUiEvent>) -> Self {
		Self {
			latency_floor: options.latency_floor(),
			default_priority: options.default_priority,
			ui_tx,
		}
	}

	/// Resolves a hover against `candidates`, given in registry order.
	pub async fn resolve(&self, hover: HoverEvent, operation: CancellableOperation, candidates: &[Arc<Provider>]) -> Resolution {
		let generation = operation.generation();
		if operation.is_cancelled() {
			return cancelled(generation);
		}
		enter(generation, Stage::Matching);

		let mut matched = match_by_link(&hover.url, &hover.text, candidates);
		match matched.len() {
			0 => {
				enter(generation, Stage::Idle);
				Resolution::Idle
			}
			1 => {
				let provider = matched.remove(0);
				self.fetch_and_deliver(hover, operation, provider).await
			}
			count => {
				tracing::debug!(generation, candidates = count, url = %hover.url, "pipeline.ambiguous");
				let event = PopupUiEvent::Choose {
					operation,
					hover,
					candidates: matched.clone(),
				};
				if self.ui_tx.send(event).is_err() {
					return cancelled(generation);
				}
				Resolution::Ambiguous(matched)
			}
		}
	}

	/// Fetches from `provider` and posts the content, keeping at least the
	/// latency floor between fetch start and delivery.
	pub async fn fetch_and_deliver(&self, hover: HoverEvent, operation: CancellableOperation, provider: Arc<Provider>) -> Resolution {
		let generation = operation.generation();
		if operation.is_cancelled() {
			return cancelled(generation);
		}
		enter(generation, Stage::Fetching);

		let started = Instant::now();
		let fetcher = provider.fetcher();
		let task = glance_worker::spawn(TaskClass::Background, {
			let operation = operation.clone();
			let url = hover.url.clone();
			async move { fetcher.fetch(operation, url).await }
		});

		// Dropping the handle detaches the fetch; its result is discarded.
		let joined = tokio::select! {
			biased;
			_ = operation.cancelled() => return cancelled(generation),
			joined = task => joined,
		};

		let fragment = match joined {
			Ok(Ok(fragment)) if !fragment.is_empty() => fragment,
			Ok(Ok(_)) => {
				tracing::warn!(provider = provider.name(), url = %hover.url, "provider returned empty content");
				return failed(generation);
			}
			Ok(Err(err)) => {
				tracing::warn!(provider = provider.name(), url = %hover.url, error = %err, "provider fetch failed");
				return failed(generation);
			}
			Err(err) => match join_error_panic_message(err) {
				Some(message) => {
					tracing::error!(provider = provider.name(), url = %hover.url, panic = %message, "provider fetch panicked");
					return failed(generation);
				}
				None => return cancelled(generation),
			},
		};

		if operation.is_cancelled() {
			return cancelled(generation);
		}

		let elapsed = started.elapsed();
		if let Some(remaining) = self.latency_floor.checked_sub(elapsed).filter(|d| !d.is_zero()) {
			enter(generation, Stage::LatencyNormalizing);
			tokio::select! {
				biased;
				_ = operation.cancelled() => return cancelled(generation),
				_ = tokio::time::sleep(remaining) => {}
			}
		}

		if operation.is_cancelled() {
			return cancelled(generation);
		}
		enter(generation, Stage::Delivering);

		let request = DisplayRequest {
			fragment,
			anchor: hover.anchor,
			provider: provider.name().to_string(),
			url: hover.url,
			default_priority: self.default_priority,
		};
		if self.ui_tx.send(PopupUiEvent::Show { operation, request }).is_err() {
			tracing::debug!(generation, "popup ui closed");
			return cancelled(generation);
		}
		enter(generation, Stage::Displayed);
		Resolution::Delivered
	}
}
