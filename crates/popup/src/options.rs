//! Host-supplied popup options.

use std::time::Duration;

use serde::Deserialize;

/// Extract priority used when the host does not configure one.
pub const DEFAULT_PRIORITY: f64 = 30.0;

/// Minimum time between the start of a fetch and delivery of its content.
pub const DEFAULT_LATENCY_FLOOR_MS: u64 = 400;

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
	#[error("failed to parse popup options: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("default priority {0} is outside 0..=100")]
	InvalidPriority(f64),

	#[error("dispatcher poll interval must be non-zero")]
	ZeroPollInterval,
}

/// Read-only options consumed when the popup service is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopupOptions {
	/// Priority attached to extracts created from a popup, in `0..=100`.
	pub default_priority: f64,
	/// Only react to hovers made while the ctrl key is held.
	pub require_ctrl_key: bool,
	pub latency_floor_ms: u64,
	pub dispatcher_poll_ms: u64,
}

impl Default for PopupOptions {
	fn default() -> Self {
		Self {
			default_priority: DEFAULT_PRIORITY,
			require_ctrl_key: false,
			latency_floor_ms: DEFAULT_LATENCY_FLOOR_MS,
			dispatcher_poll_ms: glance_worker::DEFAULT_POLL_INTERVAL.as_millis() as u64,
		}
	}
}

impl PopupOptions {
	/// Parses and validates options from TOML text; absent keys keep their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
		let options: Self = toml::from_str(text)?;
		options.validate()?;
		Ok(options)
	}

	pub fn validate(&self) -> Result<(), OptionsError> {
		if !(0.0..=100.0).contains(&self.default_priority) {
			return Err(OptionsError::InvalidPriority(self.default_priority));
		}
		if self.dispatcher_poll_ms == 0 {
			return Err(OptionsError::ZeroPollInterval);
		}
		Ok(())
	}

	pub fn latency_floor(&self) -> Duration {
		Duration::from_millis(self.latency_floor_ms)
	}

	pub fn dispatcher_poll(&self) -> Duration {
		Duration::from_millis(self.dispatcher_poll_ms)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_text_yields_defaults() {
		let options = PopupOptions::from_toml_str("").unwrap();
		assert_eq!(options, PopupOptions::default());
		assert_eq!(options.default_priority, 30.0);
		assert!(!options.require_ctrl_key);
		assert_eq!(options.latency_floor(), Duration::from_millis(400));
		assert_eq!(options.dispatcher_poll(), Duration::from_millis(100));
	}

	#[test]
	fn partial_text_overrides_given_keys() {
		let options = PopupOptions::from_toml_str("default_priority = 75.5\nrequire_ctrl_key = true\n").unwrap();
		assert_eq!(options.default_priority, 75.5);
		assert!(options.require_ctrl_key);
		assert_eq!(options.latency_floor_ms, DEFAULT_LATENCY_FLOOR_MS);
	}

	#[test]
	fn rejects_out_of_range_priority() {
		let err = PopupOptions::from_toml_str("default_priority = 101.0").unwrap_err();
		assert!(matches!(err, OptionsError::InvalidPriority(p) if p == 101.0));
		assert!(PopupOptions::from_toml_str("default_priority = -1.0").is_err());
	}

	#[test]
	fn rejects_unknown_keys_and_bad_types() {
		assert!(matches!(PopupOptions::from_toml_str("colour = \"red\""), Err(OptionsError::Parse(_))));
		assert!(matches!(PopupOptions::from_toml_str("require_ctrl_key = 3"), Err(OptionsError::Parse(_))));
		assert!(matches!(PopupOptions::from_toml_str("dispatcher_poll_ms = 0"), Err(OptionsError::ZeroPollInterval)));
	}
}
