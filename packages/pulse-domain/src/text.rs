use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub const ELLIPSIS: &str = "...";

/// Ordered rewrite passes. Every replacement is no longer than its match, so repeating the
/// passes always reaches a fixpoint.
const PASSES: [(&str, &str); 8] = [
	(r"\r\n?", "\n"),
	(r"\*\*([^*\n]+?)\*\*", "$1"),
	(r"__([^_\n]+?)__", "$1"),
	(r"\*([^*\n]+?)\*", "$1"),
	(r#"\[([^\[\]]*)\]\(\s*(?:[^()\s]|\([^()\s]*\))*(?:\s+"[^"]*")?\s*\)"#, "$1"),
	(r"(?i)https?://\S+|\bwww\.\S+", ""),
	(r"(?m)^[ \t]*#{1,6}(?:[ \t]+|$)", ""),
	(r"\n(?:[ \t]*\n){2,}", "\n\n"),
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
	PASSES
		.iter()
		.filter_map(|(pattern, replacement)| {
			Regex::new(pattern).ok().map(|re| (re, *replacement))
		})
		.collect()
});

/// Strips markup noise from free text: link markup keeps its label, bare URLs go away,
/// emphasis delimiters and header markers are dropped and runs of blank lines collapse.
///
/// `clean(clean(x)) == clean(x)` for every input.
pub fn clean(text: &str) -> String {
	let mut current = text.to_string();

	loop {
		let next = apply_passes(&current);

		if next == current {
			return next;
		}

		current = next;
	}
}

/// Cleaned text truncated to `max` grapheme clusters, with an ellipsis marker when cut.
pub fn snippet(text: &str, max: usize) -> String {
	let cleaned = clean(text);

	if cleaned.graphemes(true).count() <= max {
		return cleaned;
	}

	let mut out = cap_chars(&cleaned, max).trim_end().to_string();

	out.push_str(ELLIPSIS);

	out
}

/// Truncates to at most `max` grapheme clusters without adding a marker.
pub fn cap_chars(text: &str, max: usize) -> String {
	match text.grapheme_indices(true).nth(max) {
		Some((offset, _)) => text[..offset].to_string(),
		None => text.to_string(),
	}
}

fn apply_passes(text: &str) -> String {
	let mut out = text.to_string();

	for (re, replacement) in COMPILED.iter() {
		if re.is_match(&out) {
			out = re.replace_all(&out, *replacement).into_owned();
		}
	}

	out.trim().to_string()
}
