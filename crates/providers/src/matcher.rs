//! Provider selection for hovered links and for the current document.
//!
//! Both functions are pure over the providers they are given; result order is
//! the iteration order of the input (registration order for snapshots).

use std::sync::Arc;

use crate::context::DocumentContext;
use crate::provider::Provider;

/// Providers whose context filter accepts `context`.
///
/// Providers without a context filter never match here; they only take part
/// in link matching.
pub fn match_by_context<'a>(providers: impl IntoIterator<Item = &'a Arc<Provider>>, context: &DocumentContext) -> Vec<Arc<Provider>> {
	providers
		.into_iter()
		.filter(|provider| provider.context_filter().is_some_and(|filter| filter.matches(context)))
		.cloned()
		.collect()
}

/// Providers able to resolve a hovered link.
///
/// A provider matches if one of its url patterns finds `url`, or `text` is
/// one of its keywords (case-insensitive). Every matching provider is
/// reported; callers disambiguate when more than one comes back. Empty `url`
/// or `text` yields no providers.
pub fn match_by_link<'a>(url: &str, text: &str, candidates: impl IntoIterator<Item = &'a Arc<Provider>>) -> Vec<Arc<Provider>> {
	if url.is_empty() || text.is_empty() {
		return Vec::new();
	}
	let text = text.trim();
	candidates
		.into_iter()
		.filter(|provider| provider.matches_url(url) || provider.has_keyword(text))
		.cloned()
		.collect()
}
