//! Hover-to-popup content resolution.
//!
//! A host builds a [`PopupService`] around a shared
//! [`glance_providers::ProviderRegistry`], reports document changes and
//! pointer activity to it, and pumps the returned [`PopupUi`] on its
//! interactive thread to show popups.

mod hover;
mod options;
mod pipeline;
mod service;
mod ui;

pub use hover::{ElementId, HoverEvent, HoverTracker, Point};
pub use options::{DEFAULT_LATENCY_FLOOR_MS, DEFAULT_PRIORITY, OptionsError, PopupOptions};
pub use pipeline::{ContentResolutionPipeline, Resolution, Stage};
pub use service::{ContextSnapshot, PopupService, ServiceError, SharedDocument};
pub use ui::{DisplayRequest, PopupDisplay, PopupUi, PopupUiEvent, channel as ui_channel};
