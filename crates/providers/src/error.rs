//! Error types for provider registration and content fetching.

use thiserror::Error;

/// Reasons a provider registration is rejected. The registry is left unchanged.
#[derive(Debug, Error)]
pub enum RegistrationError {
	/// The provider name is empty.
	#[error("provider name must not be empty")]
	EmptyName,

	/// No fetch capability was supplied.
	#[error("provider {0:?} has no fetch capability")]
	MissingFetcher(String),

	/// Neither URL patterns nor keywords were supplied.
	#[error("provider {0:?} declares neither url patterns nor keywords")]
	NothingToMatch(String),

	/// A provider with this name is already registered.
	#[error("provider {0:?} is already registered")]
	Duplicate(String),

	/// A URL, category or reference pattern failed to compile.
	#[error("provider {name:?}: invalid pattern {pattern:?}: {source}")]
	InvalidPattern {
		/// Provider being registered.
		name: String,
		/// The offending pattern text.
		pattern: String,
		/// Regex compiler error.
		#[source]
		source: regex::Error,
	},
}

/// Failure reported by a provider's fetch capability.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The provider could not produce content for the url.
	#[error("no content for {url}: {reason}")]
	Unavailable {
		/// Requested url.
		url: String,
		/// Provider-supplied explanation.
		reason: String,
	},

	/// Transport or parsing failure inside the provider.
	#[error("provider failure: {0}")]
	Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
	/// Wraps any provider-side error.
	pub fn provider(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self::Provider(err.into())
	}
}
