use futures::{StreamExt, stream};

use pulse_config::Config;
use pulse_domain::{AnalyzedPost, Comment, ScoredCandidate, comments};

use crate::CommentProvider;

/// Outcome of one candidate's comment fetch. Failures stay local to their candidate.
#[derive(Debug)]
pub enum EnrichmentOutcome {
	Comments(Vec<Comment>),
	Failed(pulse_providers::Error),
}
impl EnrichmentOutcome {
	/// Comments to attach; a failed fetch counts as no comments.
	pub fn into_comments(self) -> Vec<Comment> {
		match self {
			Self::Comments(comments) => comments,
			Self::Failed(_) => Vec::new(),
		}
	}
}

pub async fn fetch_enrichment(
	comments: &dyn CommentProvider,
	cfg: &Config,
	token: &str,
	scored: &ScoredCandidate,
) -> EnrichmentOutcome {
	match comments
		.fetch_comments(&cfg.providers.reddit, &cfg.enrichment, token, &scored.candidate.permalink)
		.await
	{
		Ok(raw) => EnrichmentOutcome::Comments(comments::select_comments(raw, &cfg.enrichment)),
		Err(err) => EnrichmentOutcome::Failed(err),
	}
}

/// Fetches comments for every ranked candidate with bounded concurrency and builds the
/// final results.
///
/// Output keeps ranked order regardless of completion order. Candidates whose fetch failed
/// or that yield no usable comments are left out.
pub async fn enrich(
	comment_provider: &dyn CommentProvider,
	cfg: &Config,
	token: &str,
	ranked: Vec<ScoredCandidate>,
) -> Vec<AnalyzedPost> {
	let concurrency = cfg.enrichment.max_concurrency.max(1);
	let pending: Vec<_> = ranked
		.into_iter()
		.map(|scored| async move {
			let outcome = fetch_enrichment(comment_provider, cfg, token, &scored).await;

			(scored, outcome)
		})
		.collect();
	let outcomes: Vec<(ScoredCandidate, EnrichmentOutcome)> =
		stream::iter(pending).buffered(concurrency).collect().await;
	let mut posts = Vec::with_capacity(outcomes.len());
	let mut failed = 0_usize;

	for (scored, outcome) in outcomes {
		if let EnrichmentOutcome::Failed(err) = &outcome {
			failed += 1;

			tracing::warn!(
				error = %err,
				candidate_id = %scored.candidate.id,
				retryable = err.is_retryable(),
				"Comment fetch failed. Treating candidate as having no comments."
			);
		}

		let top_comments = outcome.into_comments();

		if top_comments.is_empty() {
			tracing::debug!(
				candidate_id = %scored.candidate.id,
				"Candidate dropped for lacking usable comments."
			);

			continue;
		}

		posts.push(AnalyzedPost::from_candidate(
			&scored.candidate,
			top_comments,
			cfg.enrichment.snippet_chars,
		));
	}

	tracing::info!(kept = posts.len(), failed, "Enrichment settled.");

	posts
}
