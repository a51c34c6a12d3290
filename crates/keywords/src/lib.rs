//! Keyword search and in-place hyperlink annotation.
//!
//! [`KeywordIndex`] compiles the keywords of the applicable providers into a
//! single automaton; [`LinkAnnotator`] walks its matches over a
//! [`LiveDocument`] and wraps qualifying occurrences in links.

mod annotate;
mod document;
mod index;

pub use annotate::{AnnotationReport, DocumentReport, LinkAnnotator, annotate_documents};
pub use document::{Adjacent, DocumentError, LiveDocument, Segment, SegmentDocument, SpanInfo};
pub use index::{IndexError, KeywordIndex, KeywordMatch, MIN_KEYWORD_CHARS};
