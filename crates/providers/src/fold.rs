use std::borrow::Cow;

/// Lowercases `text` without moving any byte offset.
///
/// A character is replaced only when its lowercase form is a single character
/// with the same UTF-8 width; everything else is kept as-is. Offsets found in
/// the folded string are therefore valid in the input.
pub fn fold_case(text: &str) -> Cow<'_, str> {
	if !text.chars().any(|c| fold_char(c) != c) {
		return Cow::Borrowed(text);
	}
	Cow::Owned(text.chars().map(fold_char).collect())
}

/// Offset-preserving lowercase of one character.
pub fn fold_char(c: char) -> char {
	if c.is_ascii() {
		return c.to_ascii_lowercase();
	}
	let mut lower = c.to_lowercase();
	match (lower.next(), lower.next()) {
		(Some(l), None) if l.len_utf8() == c.len_utf8() => l,
		_ => c,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn folds_ascii_and_single_width_unicode() {
		assert_eq!(fold_case("Malaria TB"), "malaria tb");
		assert_eq!(fold_case("ÉCOLE"), "école");
		assert!(matches!(fold_case("already lower"), Cow::Borrowed(_)));
	}

	#[test]
	fn keeps_byte_offsets_stable() {
		// 'İ' lowercases to two chars; it must be left alone.
		let text = "İstanbul Ⱥ KELVIN";
		let folded = fold_case(text);
		assert_eq!(folded.len(), text.len());
		assert!(folded.starts_with('İ'));
		assert!(folded.ends_with("kelvin"));
	}
}
