//! Live document boundary used by the annotator.
//!
//! Offsets are byte offsets into [`LiveDocument::body_text`]. Wrapping a span
//! in a link must not change the body text, so offsets computed once stay
//! valid for the whole annotation pass.

use std::ops::Range;

/// Structural failure while reading or mutating a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
	#[error("document has no body")]
	NoBody,

	#[error("span {}..{} is outside the document", .0.start, .0.end)]
	OutOfBounds(Range<usize>),

	#[error("span {}..{} crosses element boundaries", .0.start, .0.end)]
	CrossesElements(Range<usize>),

	#[error("span {}..{} is already inside a link", .0.start, .0.end)]
	NestedLink(Range<usize>),

	#[error("document unavailable: {0}")]
	Unavailable(String),
}

/// What sits immediately next to a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacent {
	/// Start or end of the document.
	Edge,
	/// A structural line break.
	LineBreak,
	Char(char),
}

impl Adjacent {
	/// True if a keyword may end or begin here.
	pub fn is_boundary(self) -> bool {
		match self {
			Self::Edge | Self::LineBreak => true,
			Self::Char(c) => c.is_whitespace() || is_punctuation(c),
		}
	}
}

fn is_punctuation(c: char) -> bool {
	c.is_ascii_punctuation()
		|| matches!(
			c,
			'\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}' | '\u{00B7}' | '\u{00BB}' | '\u{00BF}'
				| '\u{2010}'..='\u{2027}'
				| '\u{2030}'..='\u{205E}'
				| '\u{3001}'..='\u{3003}'
				| '\u{3008}'..='\u{3011}'
		)
}

/// Surroundings of a span in the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanInfo {
	/// The span's parent element is already a hyperlink.
	pub inside_link: bool,
	pub before: Adjacent,
	pub after: Adjacent,
}

/// A rendered document whose text can be turned into links in place.
pub trait LiveDocument {
	/// Plain text of the document body.
	fn body_text(&self) -> Result<String, DocumentError>;

	/// Describes the element around `span` and its neighbouring characters.
	fn inspect(&self, span: Range<usize>) -> Result<SpanInfo, DocumentError>;

	/// Wraps `span` in a hyperlink to `href`, keeping the text unchanged.
	fn wrap_in_link(&mut self, span: Range<usize>, href: &str) -> Result<(), DocumentError>;
}

/// One element of a [`SegmentDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	Text(String),
	Link { href: String, text: String },
	LineBreak,
}

impl Segment {
	fn text(&self) -> &str {
		match self {
			Self::Text(text) | Self::Link { text, .. } => text,
			Self::LineBreak => "\n",
		}
	}
}

/// Flat in-memory document made of text runs, links and line breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentDocument {
	segments: Vec<Segment>,
}

impl SegmentDocument {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_segments(segments: Vec<Segment>) -> Self {
		Self { segments }
	}

	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.segments.push(Segment::Text(text.into()));
		self
	}

	pub fn link(mut self, href: impl Into<String>, text: impl Into<String>) -> Self {
		self.segments.push(Segment::Link {
			href: href.into(),
			text: text.into(),
		});
		self
	}

	pub fn line_break(mut self) -> Self {
		self.segments.push(Segment::LineBreak);
		self
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// `(href, text)` of every link, in document order.
	pub fn links(&self) -> Vec<(&str, &str)> {
		self.segments
			.iter()
			.filter_map(|segment| match segment {
				Segment::Link { href, text } => Some((href.as_str(), text.as_str())),
				_ => None,
			})
			.collect()
	}

	/// Finds the segment holding the whole of `span`, with that segment's start offset.
	fn locate(&self, span: &Range<usize>) -> Result<(usize, usize), DocumentError> {
		if span.start > span.end {
			return Err(DocumentError::OutOfBounds(span.clone()));
		}
		let mut offset = 0;
		for (idx, segment) in self.segments.iter().enumerate() {
			let len = segment.text().len();
			let end = offset + len;
			if span.start >= offset && span.start < end {
				if span.end > end || matches!(segment, Segment::LineBreak) {
					return Err(DocumentError::CrossesElements(span.clone()));
				}
				let local = span.start - offset..span.end - offset;
				let text = segment.text();
				if !text.is_char_boundary(local.start) || !text.is_char_boundary(local.end) {
					return Err(DocumentError::OutOfBounds(span.clone()));
				}
				return Ok((idx, offset));
			}
			offset = end;
		}
		Err(DocumentError::OutOfBounds(span.clone()))
	}

	fn adjacent_before(&self, idx: usize, local: usize) -> Adjacent {
		if let Some(c) = self.segments[idx].text()[..local].chars().next_back() {
			return Adjacent::Char(c);
		}
		for segment in self.segments[..idx].iter().rev() {
			match segment {
				Segment::LineBreak => return Adjacent::LineBreak,
				other => {
					if let Some(c) = other.text().chars().next_back() {
						return Adjacent::Char(c);
					}
				}
			}
		}
		Adjacent::Edge
	}

	fn adjacent_after(&self, idx: usize, local: usize) -> Adjacent {
		if let Some(c) = self.segments[idx].text()[local..].chars().next() {
			return Adjacent::Char(c);
		}
		for segment in &self.segments[idx + 1..] {
			match segment {
				Segment::LineBreak => return Adjacent::LineBreak,
				other => {
					if let Some(c) = other.text().chars().next() {
						return Adjacent::Char(c);
					}
				}
			}
		}
		Adjacent::Edge
	}
}

impl LiveDocument for SegmentDocument {
	fn body_text(&self) -> Result<String, DocumentError> {
		if self.segments.is_empty() {
			return Err(DocumentError::NoBody);
		}
		Ok(self.segments.iter().map(Segment::text).collect())
	}

	fn inspect(&self, span: Range<usize>) -> Result<SpanInfo, DocumentError> {
		let (idx, offset) = self.locate(&span)?;
		Ok(SpanInfo {
			inside_link: matches!(self.segments[idx], Segment::Link { .. }),
			before: self.adjacent_before(idx, span.start - offset),
			after: self.adjacent_after(idx, span.end - offset),
		})
	}

	fn wrap_in_link(&mut self, span: Range<usize>, href: &str) -> Result<(), DocumentError> {
		let (idx, offset) = self.locate(&span)?;
		let Segment::Text(text) = &self.segments[idx] else {
			return Err(DocumentError::NestedLink(span));
		};

		let local = span.start - offset..span.end - offset;
		let mut replacement = Vec::with_capacity(3);
		if local.start > 0 {
			replacement.push(Segment::Text(text[..local.start].to_string()));
		}
		replacement.push(Segment::Link {
			href: href.to_string(),
			text: text[local.clone()].to_string(),
		});
		if local.end < text.len() {
			replacement.push(Segment::Text(text[local.end..].to_string()));
		}
		self.segments.splice(idx..=idx, replacement);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn body_text_joins_segments() {
		let doc = SegmentDocument::new().text("see ").link("https://x", "malaria").line_break().text("and TB");
		assert_eq!(doc.body_text().unwrap(), "see malaria\nand TB");
		assert!(matches!(SegmentDocument::new().body_text(), Err(DocumentError::NoBody)));
	}

	#[test]
	fn inspect_reports_neighbours_across_segments() {
		let doc = SegmentDocument::new().text("foo").line_break().text("malaria").text("e");
		let info = doc.inspect(4..11).unwrap();
		assert_eq!(
			info,
			SpanInfo {
				inside_link: false,
				before: Adjacent::LineBreak,
				after: Adjacent::Char('e'),
			}
		);

		let info = doc.inspect(0..3).unwrap();
		assert_eq!(info.before, Adjacent::Edge);
		assert_eq!(info.after, Adjacent::LineBreak);
	}

	#[test]
	fn inspect_flags_links_and_rejects_straddling_spans() {
		let doc = SegmentDocument::new().text("a ").link("u", "malaria").text(" b");
		assert!(doc.inspect(2..9).unwrap().inside_link);
		assert!(matches!(doc.inspect(0..4), Err(DocumentError::CrossesElements(_))));
		assert!(matches!(doc.inspect(40..44), Err(DocumentError::OutOfBounds(_))));
	}

	#[test]
	fn wrap_splits_text_run() {
		let mut doc = SegmentDocument::new().text("see malaria now");
		doc.wrap_in_link(4..11, "https://med/malaria").unwrap();
		assert_eq!(
			doc.segments(),
			&[
				Segment::Text("see ".into()),
				Segment::Link {
					href: "https://med/malaria".into(),
					text: "malaria".into(),
				},
				Segment::Text(" now".into()),
			]
		);
		assert_eq!(doc.body_text().unwrap(), "see malaria now");
		assert!(matches!(doc.wrap_in_link(4..11, "again"), Err(DocumentError::NestedLink(_))));
	}

	#[test]
	fn punctuation_and_whitespace_are_boundaries() {
		for c in [' ', '\t', ',', '.', '(', '»', '—', '、'] {
			assert!(Adjacent::Char(c).is_boundary(), "{c:?}");
		}
		for c in ['e', 'Z', '7', 'é'] {
			assert!(!Adjacent::Char(c).is_boundary(), "{c:?}");
		}
	}
}
