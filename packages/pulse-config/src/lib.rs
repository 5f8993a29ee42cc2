mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Auth, Config, DEFAULT_MODEL, Enrichment, Filter, LlmProviderConfig, Providers, Ranking,
	RedditProviderConfig, Search, Service, Synthesis, WebSearchProviderConfig,
};

use std::{fs, path::Path};

const SORT_MODES: [&str; 5] = ["relevance", "hot", "new", "top", "comments"];
const TIME_WINDOWS: [&str; 6] = ["hour", "day", "week", "month", "year", "all"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("providers.reddit.token_url", &cfg.providers.reddit.token_url),
		("providers.reddit.api_base", &cfg.providers.reddit.api_base),
		("providers.reddit.user_agent", &cfg.providers.reddit.user_agent),
		("providers.llm.api_base", &cfg.providers.llm.api_base),
		("providers.llm.default_model", &cfg.providers.llm.default_model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, timeout_ms) in [
		("providers.reddit.timeout_ms", cfg.providers.reddit.timeout_ms),
		("providers.llm.timeout_ms", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if let Some(web) = cfg.providers.web_search.as_ref() {
		if web.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.web_search.api_base must be non-empty.".to_string(),
			});
		}
		if web.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.web_search.timeout_ms must be greater than zero.".to_string(),
			});
		}
		if !(1..=10).contains(&web.num_results) {
			return Err(Error::Validation {
				message: "providers.web_search.num_results must be in the range 1-10.".to_string(),
			});
		}
	}

	if !cfg.providers.llm.temperature.is_finite() || cfg.providers.llm.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if cfg.providers.llm.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.auth.max_attempts == 0 {
		return Err(Error::Validation {
			message: "auth.max_attempts must be greater than zero.".to_string(),
		});
	}
	if !SORT_MODES.contains(&cfg.search.default_sort.as_str()) {
		return Err(Error::Validation {
			message: "search.default_sort must be one of relevance, hot, new, top, or comments."
				.to_string(),
		});
	}
	if !TIME_WINDOWS.contains(&cfg.search.default_time_window.as_str()) {
		return Err(Error::Validation {
			message:
				"search.default_time_window must be one of hour, day, week, month, year, or all."
					.to_string(),
		});
	}
	if !(1..=100).contains(&cfg.search.page_limit) {
		return Err(Error::Validation {
			message: "search.page_limit must be in the range 1-100.".to_string(),
		});
	}
	if cfg.search.max_pages == 0 {
		return Err(Error::Validation {
			message: "search.max_pages must be greater than zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.filter.min_upvote_ratio) {
		return Err(Error::Validation {
			message: "filter.min_upvote_ratio must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.min_relevance", cfg.ranking.min_relevance),
		("ranking.title_lead_bonus", cfg.ranking.title_lead_bonus),
		("ranking.title_match_bonus", cfg.ranking.title_match_bonus),
		("ranking.body_hit_weight", cfg.ranking.body_hit_weight),
		("ranking.body_hit_cap", cfg.ranking.body_hit_cap),
		("ranking.category_bonus", cfg.ranking.category_bonus),
		("ranking.engagement_scale", cfg.ranking.engagement_scale),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if cfg.ranking.title_lead_bonus < cfg.ranking.title_match_bonus {
		return Err(Error::Validation {
			message: "ranking.title_lead_bonus must be at least ranking.title_match_bonus."
				.to_string(),
		});
	}
	if cfg.ranking.top_window == 0 {
		return Err(Error::Validation {
			message: "ranking.top_window must be greater than zero.".to_string(),
		});
	}
	if cfg.ranking.enrich_count == 0 || cfg.ranking.enrich_count > cfg.ranking.top_window {
		return Err(Error::Validation {
			message: "ranking.enrich_count must be between 1 and ranking.top_window.".to_string(),
		});
	}
	if cfg.enrichment.max_concurrency == 0 {
		return Err(Error::Validation {
			message: "enrichment.max_concurrency must be greater than zero.".to_string(),
		});
	}
	if cfg.enrichment.max_comments == 0 {
		return Err(Error::Validation {
			message: "enrichment.max_comments must be greater than zero.".to_string(),
		});
	}
	if cfg.enrichment.snippet_chars == 0 {
		return Err(Error::Validation {
			message: "enrichment.snippet_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.synthesis.content_chars == 0 || cfg.synthesis.comment_chars == 0 {
		return Err(Error::Validation {
			message: "synthesis.content_chars and synthesis.comment_chars must be greater than zero."
				.to_string(),
		});
	}

	if !cfg.synthesis.research_temperature.is_finite() || cfg.synthesis.research_temperature < 0.0
	{
		return Err(Error::Validation {
			message: "synthesis.research_temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if cfg.synthesis.research_max_tokens == 0 {
		return Err(Error::Validation {
			message: "synthesis.research_max_tokens must be greater than zero.".to_string(),
		});
	}

	for (label, count) in [
		("synthesis.pain_points", cfg.synthesis.pain_points),
		("synthesis.communities", cfg.synthesis.communities),
		("synthesis.triggers", cfg.synthesis.triggers),
		("synthesis.market_trends", cfg.synthesis.market_trends),
		("synthesis.consumer_insights", cfg.synthesis.consumer_insights),
		("synthesis.industry_insights", cfg.synthesis.industry_insights),
		("synthesis.seasonal_topics", cfg.synthesis.seasonal_topics),
	] {
		if count == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	trim_base(&mut cfg.providers.reddit.api_base);
	trim_base(&mut cfg.providers.llm.api_base);

	if let Some(web) = cfg.providers.web_search.as_mut() {
		trim_base(&mut web.api_base);
	}

	cfg.models.retain(|_, model| !model.trim().is_empty());
}

fn trim_base(base: &mut String) {
	let trimmed = base.trim().trim_end_matches('/').to_string();

	*base = trimmed;
}
