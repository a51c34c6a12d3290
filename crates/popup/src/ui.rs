//! Interactive-thread side of the pipeline.
//!
//! Background work never touches the display directly. It posts
//! [`PopupUiEvent`]s on an unbounded channel and the host drains them with
//! [`PopupUi::pump`] from its UI thread.

use std::sync::Arc;

use glance_providers::{ContentFragment, Provider};
use glance_worker::CancellableOperation;
use tokio::sync::mpsc;

use crate::hover::{HoverEvent, Point};

/// Content ready to be shown in a popup.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRequest {
	pub fragment: ContentFragment,
	pub anchor: Point,
	pub provider: String,
	pub url: String,
	/// Priority for extracts created from the popup.
	pub default_priority: f64,
}

#[derive(Debug)]
pub enum PopupUiEvent {
	Show {
		operation: CancellableOperation,
		request: DisplayRequest,
	},
	/// Several providers matched; the user picks one.
	Choose {
		operation: CancellableOperation,
		hover: HoverEvent,
		candidates: Vec<Arc<Provider>>,
	},
}

impl PopupUiEvent {
	pub fn operation(&self) -> &CancellableOperation {
		match self {
			Self::Show { operation, .. } | Self::Choose { operation, .. } => operation,
		}
	}
}

/// Host display collaborator, called on the interactive thread only.
pub trait PopupDisplay {
	fn display(&mut self, request: DisplayRequest);

	/// Offers `candidates` for the hovered link. The host resumes the pipeline
	/// with `PopupService::choose` once the user has picked one.
	fn choose(&mut self, operation: CancellableOperation, hover: HoverEvent, candidates: Vec<Arc<Provider>>);
}

/// Receiving end of the UI channel.
#[derive(Debug)]
pub struct PopupUi {
	rx: mpsc::UnboundedReceiver<PopupUiEvent>,
}

/// Creates the UI channel; the sender goes to a [`crate::ContentResolutionPipeline`].
pub fn channel() -> (mpsc::UnboundedSender<PopupUiEvent>, PopupUi) {
	let (tx, rx) = mpsc::unbounded_channel();
	(tx, PopupUi { rx })
}

impl PopupUi {
	/// Hands every pending event to `display`, dropping events whose
	/// operation was cancelled meanwhile. Returns the number handed over.
	pub fn pump(&mut self, display: &mut impl PopupDisplay) -> usize {
		let mut shown = 0;
		while let Ok(event) = self.rx.try_recv() {
			if event.operation().is_cancelled() {
				tracing::trace!(generation = event.operation().generation(), "popup.ui.stale");
				continue;
			}
			match event {
				PopupUiEvent::Show { request, .. } => display.display(request),
				PopupUiEvent::Choose {
					operation,
					hover,
					candidates,
				} => display.choose(operation, hover, candidates),
			}
			shown += 1;
		}
		shown
	}

	/// Waits for the next event, for hosts whose UI loop is async.
	pub async fn recv(&mut self) -> Option<PopupUiEvent> {
		self.rx.recv().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hover::ElementId;

	#[derive(Default)]
	struct Recorder {
		shown: Vec<DisplayRequest>,
		choices: usize,
	}

	impl PopupDisplay for Recorder {
		fn display(&mut self, request: DisplayRequest) {
			self.shown.push(request);
		}

		fn choose(&mut self, _operation: CancellableOperation, _hover: HoverEvent, _candidates: Vec<Arc<Provider>>) {
			self.choices += 1;
		}
	}

	fn request(url: &str) -> DisplayRequest {
		DisplayRequest {
			fragment: ContentFragment::new("<p>x</p>"),
			anchor: Point { x: 3, y: 4 },
			provider: "wiki".into(),
			url: url.into(),
			default_priority: 30.0,
		}
	}

	#[test]
	fn pump_skips_cancelled_operations() {
		let (tx, mut ui) = channel();
		let stale = CancellableOperation::new(1);
		let live = CancellableOperation::new(2);
		tx.send(PopupUiEvent::Show {
			operation: stale.clone(),
			request: request("a"),
		})
		.unwrap();
		tx.send(PopupUiEvent::Show {
			operation: live,
			request: request("b"),
		})
		.unwrap();
		tx.send(PopupUiEvent::Choose {
			operation: CancellableOperation::new(3),
			hover: HoverEvent::new(ElementId(1), "u", "t"),
			candidates: Vec::new(),
		})
		.unwrap();
		stale.cancel();

		let mut recorder = Recorder::default();
		assert_eq!(ui.pump(&mut recorder), 2);
		assert_eq!(recorder.shown, vec![request("b")]);
		assert_eq!(recorder.choices, 1);
		assert_eq!(ui.pump(&mut recorder), 0);
	}
}
