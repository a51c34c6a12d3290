//! Turns keyword occurrences in a live document into hyperlinks.

use std::sync::Arc;

use glance_providers::{Provider, REFERENCE_MARKER, fold_case};

use crate::document::{DocumentError, LiveDocument};
use crate::index::{KeywordIndex, KeywordMatch};

/// Outcome of annotating one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentReport {
	/// Spans wrapped in a new link.
	pub linked: usize,
	/// Occurrences whose element is already a link.
	pub in_link: usize,
	/// Occurrences not flanked by a word boundary on both sides.
	pub unbounded: usize,
	/// Occurrences overlapping an earlier candidate or a wrapped span.
	pub overlapped: usize,
	/// Occurrences spread over more than one element.
	pub split: usize,
	/// Keywords no applicable provider maps to a url.
	pub unresolved: usize,
}

/// Totals over a batch of documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
	pub documents: usize,
	/// Documents abandoned after a structural failure.
	pub failed: usize,
	pub linked: usize,
}

/// Links keywords of the applicable providers inside documents.
#[derive(Debug, Clone, Copy)]
pub struct LinkAnnotator<'a> {
	providers: &'a [Arc<Provider>],
	index: &'a KeywordIndex,
}

impl<'a> LinkAnnotator<'a> {
	/// `providers` must be in registry order; the first one mapping a keyword supplies its url.
	pub fn new(providers: &'a [Arc<Provider>], index: &'a KeywordIndex) -> Self {
		Self { providers, index }
	}

	/// Candidate matches in `folded`, before the reference marker, ordered
	/// by start ascending then length descending.
	pub fn plan<'t>(&self, folded: &'t str) -> Vec<KeywordMatch<'t>>
	where
		'a: 't,
	{
		let limit = folded.find(REFERENCE_MARKER).unwrap_or(folded.len());
		let mut matches: Vec<_> = self.index.search(folded).filter(|m| m.end <= limit).collect();
		matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));
		matches
	}

	fn resolve(&self, word: &str) -> Option<&'a str> {
		self.providers.iter().find_map(|p| p.keyword_url(word))
	}

	/// Annotates a single document.
	///
	/// Fails only on structural errors; partial work done before the failure
	/// stays in the document.
	pub fn annotate<D: LiveDocument + ?Sized>(&self, doc: &mut D) -> Result<DocumentReport, DocumentError> {
		let text = doc.body_text()?;
		let folded = fold_case(&text);
		let mut report = DocumentReport::default();
		let mut cursor = 0;

		for m in self.plan(&folded) {
			if m.start < cursor {
				report.overlapped += 1;
				continue;
			}
			let span = m.start..m.end;
			let info = match doc.inspect(span.clone()) {
				Ok(info) => info,
				Err(DocumentError::CrossesElements(_)) => {
					report.split += 1;
					continue;
				}
				Err(err) => return Err(err),
			};
			if info.inside_link {
				report.in_link += 1;
				continue;
			}
			if !info.before.is_boundary() || !info.after.is_boundary() {
				report.unbounded += 1;
				continue;
			}
			let Some(url) = self.resolve(m.word) else {
				report.unresolved += 1;
				continue;
			};

			doc.wrap_in_link(span, url)?;
			tracing::trace!(keyword = m.word, start = m.start, url, "keyword linked");
			report.linked += 1;
			cursor = m.end;
		}

		Ok(report)
	}

	/// Annotates every document, skipping past the ones that fail.
	pub fn annotate_all<'d, D, I>(&self, docs: I) -> AnnotationReport
	where
		D: LiveDocument + ?Sized + 'd,
		I: IntoIterator<Item = &'d mut D>,
	{
		let mut total = AnnotationReport::default();
		for (position, doc) in docs.into_iter().enumerate() {
			total.documents += 1;
			match self.annotate(doc) {
				Ok(report) => total.linked += report.linked,
				Err(err) => {
					total.failed += 1;
					tracing::debug!(document = position, error = %err, "annotation aborted");
				}
			}
		}
		total
	}
}

/// Annotates `docs` with the keywords of `providers`.
pub fn annotate_documents<'d, D, I>(providers: &[Arc<Provider>], index: &KeywordIndex, docs: I) -> AnnotationReport
where
	D: LiveDocument + ?Sized + 'd,
	I: IntoIterator<Item = &'d mut D>,
{
	LinkAnnotator::new(providers, index).annotate_all(docs)
}
