//! Provider definitions.
//!
//! A [`ProviderSpec`] is the raw registration request; the registry validates
//! it and compiles it into an immutable [`Provider`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use glance_worker::CancellableOperation;
use indexmap::IndexMap;
use regex::Regex;

use crate::context::{DocumentContext, References};
use crate::error::{FetchError, RegistrationError};
use crate::fold::fold_case;

/// HTML fragment produced by a provider for display in a popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFragment {
	pub html: String,
}

impl ContentFragment {
	pub fn new(html: impl Into<String>) -> Self {
		Self { html: html.into() }
	}

	/// True when there is nothing worth displaying.
	pub fn is_empty(&self) -> bool {
		self.html.trim().is_empty()
	}
}

/// Fetch capability supplied by a provider.
///
/// Implementations may poll `operation` to stop early; the pipeline discards
/// the result of a cancelled operation either way.
#[async_trait]
pub trait ContentFetcher: Send + Sync + 'static {
	async fn fetch(&self, operation: CancellableOperation, url: String) -> Result<ContentFragment, FetchError>;
}

struct FnFetcher<F>(F);

#[async_trait]
impl<F, Fut> ContentFetcher for FnFetcher<F>
where
	F: Fn(CancellableOperation, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<ContentFragment, FetchError>> + Send + 'static,
{
	async fn fetch(&self, operation: CancellableOperation, url: String) -> Result<ContentFragment, FetchError> {
		(self.0)(operation, url).await
	}
}

/// Adapts an async closure into a [`ContentFetcher`].
pub fn fetch_fn<F, Fut>(f: F) -> Arc<dyn ContentFetcher>
where
	F: Fn(CancellableOperation, String) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<ContentFragment, FetchError>> + Send + 'static,
{
	Arc::new(FnFetcher(f))
}

/// Keyword → fallback url map with case-insensitive keys.
///
/// Keys are stored case-folded; when two keys fold to the same text the
/// first one wins.
#[derive(Debug, Clone, Default)]
pub struct KeywordMap {
	entries: IndexMap<Box<str>, Box<str>>,
}

impl KeywordMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a keyword unless an equivalent one is already present.
	pub fn insert(&mut self, keyword: &str, url: &str) -> bool {
		let key = fold_case(keyword.trim());
		if key.is_empty() || self.entries.contains_key(key.as_ref()) {
			return false;
		}
		self.entries.insert(key.into_owned().into_boxed_str(), url.into());
		true
	}

	/// Looks up the url for `keyword`, ignoring case.
	pub fn get(&self, keyword: &str) -> Option<&str> {
		self.entries.get(fold_case(keyword).as_ref()).map(AsRef::as_ref)
	}

	pub fn contains(&self, keyword: &str) -> bool {
		self.get(keyword).is_some()
	}

	/// Case-folded keywords in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(AsRef::as_ref)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for KeywordMap {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut map = Self::new();
		for (k, v) in iter {
			map.insert(k.as_ref(), v.as_ref());
		}
		map
	}
}

/// Uncompiled document-context filter.
#[derive(Debug, Clone, Default)]
pub struct ContextFilterSpec {
	pub category_patterns: Vec<String>,
	pub source_patterns: Vec<String>,
	pub link_patterns: Vec<String>,
	pub title_patterns: Vec<String>,
	pub author_patterns: Vec<String>,
}

/// Compiled document-context filter.
#[derive(Debug, Clone)]
pub struct ContextFilter {
	categories: Vec<Regex>,
	source: Vec<Regex>,
	link: Vec<Regex>,
	title: Vec<Regex>,
	author: Vec<Regex>,
}

impl ContextFilter {
	fn compile(name: &str, spec: &ContextFilterSpec) -> Result<Self, RegistrationError> {
		Ok(Self {
			categories: compile_all(name, &spec.category_patterns)?,
			source: compile_all(name, &spec.source_patterns)?,
			link: compile_all(name, &spec.link_patterns)?,
			title: compile_all(name, &spec.title_patterns)?,
			author: compile_all(name, &spec.author_patterns)?,
		})
	}

	/// True if any category pattern matches an ancestor category, or any
	/// reference pattern matches its field.
	pub fn matches(&self, context: &DocumentContext) -> bool {
		self.matches_categories(context.categories()) || context.references().is_some_and(|refs| self.matches_references(refs))
	}

	fn matches_categories(&self, categories: &[String]) -> bool {
		categories
			.iter()
			.filter(|name| !name.is_empty())
			.any(|name| self.categories.iter().any(|re| re.is_match(name)))
	}

	/// Fields are tried as source, link, title, author; first hit wins.
	fn matches_references(&self, refs: &References) -> bool {
		any_match(refs.source.as_deref(), &self.source)
			|| any_match(refs.link.as_deref(), &self.link)
			|| any_match(refs.title.as_deref(), &self.title)
			|| any_match(refs.author.as_deref(), &self.author)
	}
}

fn any_match(field: Option<&str>, patterns: &[Regex]) -> bool {
	match field {
		Some(value) if !value.is_empty() => patterns.iter().any(|re| re.is_match(value)),
		_ => false,
	}
}

fn compile_all(name: &str, patterns: &[String]) -> Result<Vec<Regex>, RegistrationError> {
	patterns
		.iter()
		.map(|pattern| {
			Regex::new(pattern).map_err(|source| RegistrationError::InvalidPattern {
				name: name.to_string(),
				pattern: pattern.clone(),
				source,
			})
		})
		.collect()
}

/// Registration request for one provider.
#[derive(Clone, Default)]
pub struct ProviderSpec {
	pub name: String,
	pub url_patterns: Vec<String>,
	pub keywords: Option<KeywordMap>,
	pub context_filter: Option<ContextFilterSpec>,
	pub fetcher: Option<Arc<dyn ContentFetcher>>,
}

impl fmt::Debug for ProviderSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderSpec")
			.field("name", &self.name)
			.field("url_patterns", &self.url_patterns)
			.field("keywords", &self.keywords.as_ref().map(KeywordMap::len))
			.field("context_filter", &self.context_filter.is_some())
			.field("fetcher", &self.fetcher.is_some())
			.finish()
	}
}

impl ProviderSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.url_patterns.push(pattern.into());
		self
	}

	pub fn keyword(mut self, keyword: &str, url: &str) -> Self {
		self.keywords.get_or_insert_with(KeywordMap::new).insert(keyword, url);
		self
	}

	pub fn keywords(mut self, keywords: KeywordMap) -> Self {
		self.keywords = Some(keywords);
		self
	}

	pub fn context_filter(mut self, filter: ContextFilterSpec) -> Self {
		self.context_filter = Some(filter);
		self
	}

	pub fn fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
		self.fetcher = Some(fetcher);
		self
	}

	/// Validates and compiles the request.
	pub(crate) fn compile(self) -> Result<Provider, RegistrationError> {
		if self.name.is_empty() {
			return Err(RegistrationError::EmptyName);
		}
		let Some(fetcher) = self.fetcher else {
			return Err(RegistrationError::MissingFetcher(self.name));
		};
		let keywords = self.keywords.filter(|k| !k.is_empty());
		if self.url_patterns.is_empty() && keywords.is_none() {
			return Err(RegistrationError::NothingToMatch(self.name));
		}

		let url_patterns = compile_all(&self.name, &self.url_patterns)?;
		let context_filter = self.context_filter.as_ref().map(|spec| ContextFilter::compile(&self.name, spec)).transpose()?;

		Ok(Provider {
			name: self.name.into_boxed_str(),
			url_patterns,
			keywords,
			context_filter,
			fetcher,
		})
	}
}

/// A registered, immutable content provider.
pub struct Provider {
	name: Box<str>,
	url_patterns: Vec<Regex>,
	keywords: Option<KeywordMap>,
	context_filter: Option<ContextFilter>,
	fetcher: Arc<dyn ContentFetcher>,
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Provider")
			.field("name", &self.name)
			.field("url_patterns", &self.url_patterns.iter().map(Regex::as_str).collect::<Vec<_>>())
			.field("keywords", &self.keywords.as_ref().map(KeywordMap::len))
			.field("context_filter", &self.context_filter.is_some())
			.finish_non_exhaustive()
	}
}

impl Provider {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn keywords(&self) -> Option<&KeywordMap> {
		self.keywords.as_ref()
	}

	pub fn context_filter(&self) -> Option<&ContextFilter> {
		self.context_filter.as_ref()
	}

	pub fn fetcher(&self) -> Arc<dyn ContentFetcher> {
		Arc::clone(&self.fetcher)
	}

	/// True if any url pattern finds a match anywhere in `url`.
	pub fn matches_url(&self, url: &str) -> bool {
		self.url_patterns.iter().any(|re| re.is_match(url))
	}

	/// True if `text` is one of this provider's keywords, ignoring case.
	pub fn has_keyword(&self, text: &str) -> bool {
		self.keywords.as_ref().is_some_and(|k| k.contains(text))
	}

	/// Fallback url mapped to `keyword`, if any.
	pub fn keyword_url(&self, keyword: &str) -> Option<&str> {
		self.keywords.as_ref()?.get(keyword)
	}
}
