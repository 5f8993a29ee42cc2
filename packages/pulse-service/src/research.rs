use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use pulse_config::Config;
use pulse_domain::{WebResult, query, sources, text};

use crate::{
	Error, MarketResearchReport, Providers, PulseService, RESEARCH_MODEL_KEY, Result, Stage,
	synthesis,
};

/// Placeholder link used for web results that carry none.
const MISSING_LINK: &str = "#";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketResearchRequest {
	pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketResearchResponse {
	pub results: Vec<WebResult>,
	pub analysis: MarketResearchReport,
	/// RFC 3339 completion time.
	pub timestamp: String,
}

impl PulseService {
	/// Web-search variant of the pipeline: search results go straight to synthesis.
	///
	/// Runs are coalesced per trimmed query, independently of `analyze`.
	pub async fn research_market(&self, req: MarketResearchRequest) -> Result<MarketResearchResponse> {
		let key = query::validate_query(&req.query)?;
		let pipeline = run_research(self.cfg.clone(), self.providers.clone(), key.clone());

		self.research_flights.run(&key, pipeline).await
	}
}

async fn run_research(
	cfg: Arc<Config>,
	providers: Providers,
	query: String,
) -> Result<MarketResearchResponse> {
	let Some(web) = cfg.providers.web_search.as_ref() else {
		return Err(Error::Config {
			message: "providers.web_search must be configured for market research.".to_string(),
		});
	};

	crate::require_credential("providers.web_search.api_key", &web.api_key)?;
	crate::require_credential("providers.web_search.engine_id", &web.engine_id)?;
	crate::require_credential("providers.llm.api_key", &cfg.providers.llm.api_key)?;

	let model = crate::resolve_model(&cfg, providers.models.as_ref(), RESEARCH_MODEL_KEY);
	let raw = providers
		.web_search
		.search_web(web, &query)
		.await
		.map_err(|err| Error::from_provider(Stage::Fetch, err))?;

	if raw.is_empty() {
		return Err(Error::NoCandidates { stage: Stage::Fetch });
	}

	let results: Vec<WebResult> = raw.into_iter().map(clean_result).collect();
	let links = sources::dedup_links(
		results.iter().map(|result| result.link.clone()).filter(|link| link != MISSING_LINK),
	);

	tracing::info!(
		query_key = %crate::query_fingerprint(&query),
		candidates = results.len(),
		sources = links.len(),
		"Web results collected."
	);

	let analysis = synthesis::synthesize_market_research(
		providers.completion.as_ref(),
		&cfg,
		&model,
		&query,
		&results,
		&links,
	)
	.await?;
	let timestamp = OffsetDateTime::now_utc()
		.format(&Rfc3339)
		.map_err(|err| Error::Internal { message: format!("Failed to format timestamp: {err}.") })?;

	Ok(MarketResearchResponse { results, analysis, timestamp })
}

fn clean_result(result: WebResult) -> WebResult {
	WebResult {
		title: text::clean(&result.title),
		snippet: text::clean(&result.snippet),
		link: result.link,
	}
}
