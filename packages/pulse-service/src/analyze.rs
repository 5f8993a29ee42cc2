use std::sync::Arc;

use serde::{Deserialize, Serialize};

use pulse_config::Config;
use pulse_domain::{AnalyzedPost, Candidate, SearchParams, quality, query, relevance, sources};
use pulse_providers::retry::Backoff;

use crate::{
	ANALYZE_MODEL_KEY, Error, InsightReport, Providers, PulseService, Result, Stage, enrich,
	synthesis,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
	pub query: String,
	#[serde(flatten)]
	pub params: SearchParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
	pub results: Vec<AnalyzedPost>,
	pub insights: InsightReport,
}

impl PulseService {
	/// Runs the discussion pipeline for `query`.
	///
	/// The query is validated before anything else happens. Concurrent calls with the same
	/// trimmed query share one run and its outcome.
	pub async fn analyze(&self, req: AnalyzeRequest) -> Result<AnalyzeResponse> {
		let key = query::validate_query(&req.query)?;
		let pipeline = run_analysis(self.cfg.clone(), self.providers.clone(), key.clone(), req.params);

		self.analyze_flights.run(&key, pipeline).await
	}
}

async fn run_analysis(
	cfg: Arc<Config>,
	providers: Providers,
	query: String,
	params: SearchParams,
) -> Result<AnalyzeResponse> {
	let query_key = crate::query_fingerprint(&query);

	check_credentials(&cfg)?;

	let model = crate::resolve_model(&cfg, providers.models.as_ref(), ANALYZE_MODEL_KEY);
	let backoff = Backoff::from_config(&cfg.auth);
	let token = providers
		.token
		.acquire_token(&cfg.providers.reddit, &backoff)
		.await
		.map_err(|err| Error::from_provider(Stage::Auth, err))?;
	let fetched = fetch_candidates(&cfg, &providers, &token.access_token, &query, &params).await?;

	if fetched.is_empty() {
		tracing::info!(query_key = %query_key, "Search returned no candidates.");

		return Err(Error::NoCandidates { stage: Stage::Fetch });
	}

	let fetched_count = fetched.len();
	let accepted: Vec<Candidate> =
		fetched.into_iter().filter(|candidate| passes_quality(candidate, &cfg)).collect();
	let accepted_count = accepted.len();
	let mut ranked = relevance::rank(accepted, &query, &cfg.ranking);

	tracing::info!(
		query_key = %query_key,
		candidates = fetched_count,
		accepted = accepted_count,
		kept = ranked.len(),
		"Candidates filtered and ranked."
	);

	if ranked.is_empty() {
		return Err(Error::NoCandidates { stage: Stage::Filter });
	}

	ranked.truncate(cfg.ranking.enrich_count);

	let results =
		enrich::enrich(providers.comments.as_ref(), &cfg, &token.access_token, ranked).await;

	if results.is_empty() {
		return Err(Error::NoCandidates { stage: Stage::Enrichment });
	}

	let aggregate = sources::collect_sources(&results);
	let insights = synthesis::synthesize(
		providers.completion.as_ref(),
		&cfg,
		&model,
		&query,
		&results,
		&aggregate,
	)
	.await?;

	Ok(AnalyzeResponse { results, insights })
}

/// Follows the pagination cursor for up to `search.max_pages` pages.
async fn fetch_candidates(
	cfg: &Config,
	providers: &Providers,
	token: &str,
	query: &str,
	params: &SearchParams,
) -> Result<Vec<Candidate>> {
	let mut request = params.resolve(&cfg.search);
	let mut candidates = Vec::new();
	let max_pages = cfg.search.max_pages.max(1);

	for page_index in 1..=max_pages {
		let page = providers
			.source
			.search_page(&cfg.providers.reddit, token, query, &request)
			.await
			.map_err(|err| Error::from_provider(Stage::Fetch, err))?;
		let page_len = page.candidates.len();

		tracing::debug!(page = page_index, candidates = page_len, "Search page fetched.");

		candidates.extend(page.candidates);

		match page.after {
			Some(after) if page_index < max_pages && page_len > 0 => request.after = Some(after),
			_ => break,
		}
	}

	Ok(candidates)
}

fn passes_quality(candidate: &Candidate, cfg: &Config) -> bool {
	match quality::qualitygate(candidate, &cfg.filter) {
		Ok(()) => true,
		Err(code) => {
			tracing::debug!(candidate_id = %candidate.id, reason = code.as_str(), "Candidate rejected.");

			false
		},
	}
}

fn check_credentials(cfg: &Config) -> Result<()> {
	crate::require_credential("providers.reddit.client_id", &cfg.providers.reddit.client_id)?;
	crate::require_credential(
		"providers.reddit.client_secret",
		&cfg.providers.reddit.client_secret,
	)?;
	crate::require_credential("providers.llm.api_key", &cfg.providers.llm.api_key)?;

	Ok(())
}
