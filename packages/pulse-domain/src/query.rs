use std::collections::HashSet;

pub const MIN_QUERY_CHARS: usize = 2;

/// Query terms shorter than this many characters carry no ranking weight.
const MIN_TERM_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
	#[error("Query must be non-empty.")]
	Empty,
	#[error("Query must be at least {min} characters after trimming.")]
	TooShort { min: usize },
}

/// Trims the raw query and enforces the minimum length. The returned text doubles as the
/// single-flight key, so case is preserved.
pub fn validate_query(raw: &str) -> Result<String, QueryError> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Err(QueryError::Empty);
	}
	if trimmed.chars().count() < MIN_QUERY_CHARS {
		return Err(QueryError::TooShort { min: MIN_QUERY_CHARS });
	}

	Ok(trimmed.to_string())
}

/// Splits a query into lowercase, de-duplicated terms longer than two characters.
pub fn query_terms(query: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(query.len());

	for ch in query.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in normalized.split_whitespace() {
		if token.chars().count() < MIN_TERM_CHARS {
			continue;
		}
		if seen.insert(token) {
			out.push(token.to_string());
		}
	}

	out
}
