//! Hover notifications and the operations they start.

use glance_worker::{CancellableOperation, GenerationClock};

/// Host-assigned identity of a hovered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Screen position in host coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
	pub x: i32,
	pub y: i32,
}

/// Pointer entered a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverEvent {
	pub element: ElementId,
	pub url: String,
	/// Visible text of the link.
	pub text: String,
	pub anchor: Point,
	/// Ctrl key held while hovering.
	pub ctrl: bool,
}

impl HoverEvent {
	pub fn new(element: ElementId, url: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			element,
			url: url.into(),
			text: text.into(),
			anchor: Point::default(),
			ctrl: false,
		}
	}

	pub fn at(mut self, x: i32, y: i32) -> Self {
		self.anchor = Point { x, y };
		self
	}

	pub fn with_ctrl(mut self, ctrl: bool) -> Self {
		self.ctrl = ctrl;
		self
	}
}

/// Owns the live hover operation of the current document.
///
/// At most one operation is live: beginning a hover cancels the previous one,
/// and [`HoverTracker::reset`] tears everything down when the document changes.
#[derive(Debug, Default)]
pub struct HoverTracker {
	clock: GenerationClock,
	active: Option<(ElementId, CancellableOperation)>,
}

impl HoverTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new operation for `element`, superseding any live one.
	pub fn begin(&mut self, element: ElementId) -> CancellableOperation {
		self.reset();
		let operation = CancellableOperation::new(self.clock.next());
		tracing::trace!(element = element.0, generation = operation.generation(), "hover.begin");
		self.active = Some((element, operation.clone()));
		operation
	}

	/// Cancels the live operation if it belongs to `element`.
	pub fn leave(&mut self, element: ElementId) -> bool {
		match &self.active {
			Some((active, _)) if *active == element => {
				self.reset();
				true
			}
			_ => false,
		}
	}

	/// Cancels the live operation, if any.
	pub fn reset(&mut self) {
		if let Some((_, operation)) = self.active.take() {
			operation.cancel();
		}
	}

	pub fn active(&self) -> Option<&CancellableOperation> {
		self.active.as_ref().map(|(_, operation)| operation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_hover_supersedes_previous() {
		let mut tracker = HoverTracker::new();
		let first = tracker.begin(ElementId(1));
		let second = tracker.begin(ElementId(2));

		assert!(first.is_cancelled());
		assert!(!second.is_cancelled());
		assert!(second.generation() > first.generation());
	}

	#[test]
	fn leave_only_cancels_matching_element() {
		let mut tracker = HoverTracker::new();
		let op = tracker.begin(ElementId(7));

		assert!(!tracker.leave(ElementId(8)));
		assert!(!op.is_cancelled());
		assert!(tracker.leave(ElementId(7)));
		assert!(op.is_cancelled());
		assert!(tracker.active().is_none());
		assert!(!tracker.leave(ElementId(7)));
	}

	#[test]
	fn reset_tears_down_live_operation() {
		let mut tracker = HoverTracker::new();
		let op = tracker.begin(ElementId(1));
		tracker.reset();
		assert!(op.is_cancelled());
		assert!(tracker.active().is_none());
	}
}
