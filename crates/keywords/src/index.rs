//! Keyword automaton built from provider keyword maps.

use std::collections::HashSet;
use std::sync::Arc;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use glance_providers::Provider;

/// Matches shorter than this many characters are never reported.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Automaton construction failure.
#[derive(Debug, thiserror::Error)]
#[error("failed to build keyword automaton: {0}")]
pub struct IndexError(#[from] aho_corasick::BuildError);

/// One keyword occurrence in scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordMatch<'a> {
	/// The case-folded keyword.
	pub word: &'a str,
	/// Byte offset of the first matched byte.
	pub start: usize,
	/// Byte offset one past the last matched byte.
	pub end: usize,
}

impl KeywordMatch<'_> {
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

/// Immutable multi-pattern index over the keywords of a provider set.
///
/// Search runs in time linear in the text plus total keyword length and
/// reports overlapping occurrences. The index is rebuilt, never mutated, when
/// the applicable providers change, so it can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
	keywords: Vec<Box<str>>,
	char_lens: Vec<usize>,
	automaton: Option<AhoCorasick>,
}

impl KeywordIndex {
	/// Builds an index over the union of the providers' keywords.
	pub fn build<'a>(providers: impl IntoIterator<Item = &'a Arc<Provider>>) -> Result<Self, IndexError> {
		Self::from_keywords(providers.into_iter().filter_map(|p| p.keywords()).flat_map(|k| k.keys()))
	}

	/// Builds an index over already case-folded keywords.
	///
	/// Duplicates collapse to the first occurrence.
	pub fn from_keywords<'k>(keywords: impl IntoIterator<Item = &'k str>) -> Result<Self, IndexError> {
		let mut seen = HashSet::new();
		let keywords: Vec<Box<str>> = keywords.into_iter().filter(|k| !k.is_empty() && seen.insert(*k)).map(Box::from).collect();
		if keywords.is_empty() {
			return Ok(Self::default());
		}

		let automaton = AhoCorasickBuilder::new()
			.match_kind(MatchKind::Standard)
			.ascii_case_insensitive(true)
			.build(keywords.iter().map(|k| k.as_bytes()))?;
		let char_lens = keywords.iter().map(|k| k.chars().count()).collect();

		tracing::debug!(keywords = keywords.len(), "keyword index built");
		Ok(Self {
			keywords,
			char_lens,
			automaton: Some(automaton),
		})
	}

	/// Number of distinct keywords, including ones too short to be reported.
	pub fn len(&self) -> usize {
		self.keywords.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keywords.is_empty()
	}

	/// Keywords in first-seen order.
	pub fn keywords(&self) -> impl Iterator<Item = &str> {
		self.keywords.iter().map(AsRef::as_ref)
	}

	/// Lazily yields every keyword occurrence in `text`, overlaps included.
	///
	/// ASCII letters match regardless of case; pass text through
	/// [`glance_providers::fold_case`] to fold other scripts too.
	pub fn search<'a>(&'a self, text: &'a str) -> impl Iterator<Item = KeywordMatch<'a>> + 'a {
		self.automaton
			.iter()
			.flat_map(move |ac| ac.find_overlapping_iter(text))
			.filter_map(move |m| {
				let id = m.pattern().as_usize();
				if self.char_lens[id] < MIN_KEYWORD_CHARS {
					return None;
				}
				Some(KeywordMatch {
					word: &self.keywords[id],
					start: m.start(),
					end: m.end(),
				})
			})
	}
}

#[cfg(test)]
mod tests {
	use glance_providers::{ContentFetcher, ContentFragment, ProviderRegistry, ProviderSpec, fetch_fn};
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	fn noop() -> Arc<dyn ContentFetcher> {
		fetch_fn(|_, _| async { Ok(ContentFragment::default()) })
	}

	fn sorted(index: &KeywordIndex, text: &str) -> Vec<(String, usize)> {
		let mut out: Vec<_> = index.search(text).map(|m| (m.word.to_string(), m.start)).collect();
		out.sort();
		out
	}

	#[test]
	fn reports_overlapping_matches() {
		let index = KeywordIndex::from_keywords(["malaria", "malariae", "aria"]).unwrap();
		assert_eq!(
			sorted(&index, "plasmodium malariae"),
			vec![("aria".to_string(), 14), ("malaria".to_string(), 11), ("malariae".to_string(), 11)]
		);
	}

	#[test]
	fn short_keywords_are_indexed_but_never_reported() {
		let index = KeywordIndex::from_keywords(["tb", "x", "malaria"]).unwrap();
		assert_eq!(index.len(), 3);
		assert_eq!(sorted(&index, "see malaria and tb"), vec![("malaria".to_string(), 4)]);
	}

	#[test]
	fn ascii_case_is_ignored() {
		let index = KeywordIndex::from_keywords(["malaria"]).unwrap();
		assert_eq!(sorted(&index, "MALARIA Malaria"), vec![("malaria".to_string(), 0), ("malaria".to_string(), 8)]);
	}

	#[test]
	fn empty_index_finds_nothing() {
		let index = KeywordIndex::from_keywords(std::iter::empty()).unwrap();
		assert!(index.is_empty());
		assert_eq!(index.search("anything").count(), 0);
	}

	#[test]
	fn build_is_deterministic_and_order_independent() {
		let registry = ProviderRegistry::new();
		registry.register(ProviderSpec::new("med").keyword("Malaria", "u1").keyword("Dengue", "u2").fetcher(noop()));
		registry.register(ProviderSpec::new("wiki").keyword("malaria", "u3").keyword("Zika", "u4").fetcher(noop()));
		let providers: Vec<_> = registry.snapshot().iter().cloned().collect();
		let reversed: Vec<_> = providers.iter().rev().cloned().collect();

		let text = "malaria, dengue and zika; MALARIA again";
		let first = sorted(&KeywordIndex::build(&providers).unwrap(), text);
		let second = sorted(&KeywordIndex::build(&providers).unwrap(), text);
		let swapped = sorted(&KeywordIndex::build(&reversed).unwrap(), text);

		assert_eq!(first, second);
		assert_eq!(first, swapped);
		assert_eq!(KeywordIndex::build(&providers).unwrap().len(), 3);
	}

	fn naive(keywords: &[String], text: &str) -> Vec<(String, usize)> {
		let mut distinct: Vec<&String> = keywords.iter().filter(|k| k.chars().count() >= MIN_KEYWORD_CHARS).collect();
		distinct.sort();
		distinct.dedup();
		let mut out = Vec::new();
		for k in distinct {
			for start in 0..text.len() {
				if text[start..].starts_with(k.as_str()) {
					out.push((k.clone(), start));
				}
			}
		}
		out.sort();
		out
	}

	proptest! {
		#[test]
		fn automaton_agrees_with_naive_scan(keywords in prop::collection::vec("[ab]{1,4}", 1..8), text in "[ab ]{0,48}") {
			let index = KeywordIndex::from_keywords(keywords.iter().map(String::as_str)).unwrap();
			prop_assert_eq!(sorted(&index, &text), naive(&keywords, &text));
		}
	}
}
