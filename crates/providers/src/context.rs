//! Document context consumed by context matching.

use crate::fold::fold_case;

/// Marker opening the bibliographic reference block of a document.
pub const REFERENCE_MARKER: &str = "#supermemo reference:";

/// Bibliographic fields parsed from a document's reference block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
	pub title: Option<String>,
	pub author: Option<String>,
	pub date: Option<String>,
	pub source: Option<String>,
	pub link: Option<String>,
	pub comment: Option<String>,
}

impl References {
	/// Parses the `#Key: value` lines that follow the reference marker.
	///
	/// Returns `None` when the marker is missing or no known field is present.
	pub fn parse(text: &str) -> Option<Self> {
		let start = fold_case(text).find(REFERENCE_MARKER)?;
		let block = &text[start + REFERENCE_MARKER.len()..];

		let mut refs = Self::default();
		for line in block.lines() {
			let Some(rest) = line.trim().strip_prefix('#') else {
				continue;
			};
			let Some((key, value)) = rest.split_once(':') else {
				continue;
			};
			let value = value.trim();
			if value.is_empty() {
				continue;
			}
			let slot = match key.trim().to_ascii_lowercase().as_str() {
				"title" => &mut refs.title,
				"author" => &mut refs.author,
				"date" => &mut refs.date,
				"source" => &mut refs.source,
				"link" => &mut refs.link,
				"comment" => &mut refs.comment,
				_ => continue,
			};
			slot.get_or_insert_with(|| value.to_string());
		}

		(refs != Self::default()).then_some(refs)
	}
}

/// Where the current document sits and what it cites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
	categories: Vec<String>,
	references: Option<References>,
}

impl DocumentContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a context from category ancestry and the document's text.
	pub fn from_document(categories: impl IntoIterator<Item = impl Into<String>>, text: &str) -> Self {
		Self {
			categories: categories.into_iter().map(Into::into).collect(),
			references: References::parse(text),
		}
	}

	/// Adds an ancestor category name. Nearest ancestor first.
	pub fn with_category(mut self, name: impl Into<String>) -> Self {
		self.categories.push(name.into());
		self
	}

	pub fn with_references(mut self, references: References) -> Self {
		self.references = Some(references);
		self
	}

	pub fn categories(&self) -> &[String] {
		&self.categories
	}

	pub fn references(&self) -> Option<&References> {
		self.references.as_ref()
	}
}
