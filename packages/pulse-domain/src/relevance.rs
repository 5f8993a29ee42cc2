use pulse_config::Ranking;

use crate::{Candidate, query};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
	pub candidate: Candidate,
	pub relevance: f64,
}

/// Per-signal breakdown of one relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelevanceTerms {
	pub title: f64,
	pub body: f64,
	pub category: f64,
	pub engagement: f64,
}
impl RelevanceTerms {
	pub fn total(&self) -> f64 {
		self.title + self.body + self.category + self.engagement
	}
}

pub fn compute_relevance_terms(
	candidate: &Candidate,
	terms: &[String],
	cfg: &Ranking,
) -> RelevanceTerms {
	let title = candidate.title.trim().to_lowercase();
	let body = candidate.selftext.to_lowercase();
	let category = candidate.subreddit.to_lowercase();
	let mut out = RelevanceTerms::default();

	for term in terms {
		if title.starts_with(term.as_str()) {
			out.title += cfg.title_lead_bonus;
		} else if title.contains(term.as_str()) {
			out.title += cfg.title_match_bonus;
		}

		// Plain substring counting; user input is never compiled as a pattern.
		let occurrences = body.matches(term.as_str()).count() as f64;

		out.body += (occurrences * cfg.body_hit_weight).min(cfg.body_hit_cap);

		if category.contains(term.as_str()) {
			out.category += cfg.category_bonus;
		}
	}

	let score = candidate.score.max(0) as f64;
	let comments = candidate.num_comments as f64;

	out.engagement = cfg.engagement_scale * ((score + 1.0).log10() + (comments + 1.0).log10());

	out
}

pub fn score(candidate: &Candidate, query: &str, cfg: &Ranking) -> f64 {
	let terms = query::query_terms(query);

	compute_relevance_terms(candidate, &terms, cfg).total()
}

/// Scores, thresholds and orders candidates, keeping at most `top_window` of them.
///
/// Ordering is descending by score; equal scores keep their fetch order.
pub fn rank(candidates: Vec<Candidate>, query: &str, cfg: &Ranking) -> Vec<ScoredCandidate> {
	let terms = query::query_terms(query);
	let mut scored: Vec<ScoredCandidate> = candidates
		.into_iter()
		.map(|candidate| {
			let relevance = compute_relevance_terms(&candidate, &terms, cfg).total();

			ScoredCandidate { candidate, relevance }
		})
		.filter(|scored| scored.relevance > cfg.min_relevance)
		.collect();

	scored.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
	scored.truncate(cfg.top_window);

	scored
}
