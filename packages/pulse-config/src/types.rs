use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Model identifier used when neither the `[models]` table nor `providers.llm.default_model`
/// names one.
pub const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	/// Opaque model lookup table. Keys are api names such as `reddit_analytics`.
	#[serde(default)]
	pub models: HashMap<String, String>,
	#[serde(default)]
	pub auth: Auth,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub filter: Filter,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub enrichment: Enrichment,
	#[serde(default)]
	pub synthesis: Synthesis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub reddit: RedditProviderConfig,
	pub llm: LlmProviderConfig,
	pub web_search: Option<WebSearchProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditProviderConfig {
	pub token_url: String,
	pub api_base: String,
	#[serde(default)]
	pub client_id: String,
	#[serde(default)]
	pub client_secret: String,
	pub user_agent: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchProviderConfig {
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	#[serde(default)]
	pub engine_id: String,
	#[serde(default = "default_query_suffix")]
	pub query_suffix: String,
	#[serde(default = "default_num_results")]
	pub num_results: u32,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub path: String,
	#[serde(default)]
	pub api_key: String,
	#[serde(default = "default_model")]
	pub default_model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Auth {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	/// Delay after failed attempt `n` (1-based) is `backoff_base_ms * 2^n`.
	pub backoff_base_ms: u64,
}
impl Default for Auth {
	fn default() -> Self {
		Self { max_attempts: 3, backoff_base_ms: 1_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_sort: String,
	pub default_time_window: String,
	pub page_limit: u32,
	pub max_pages: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_sort: "relevance".to_string(),
			default_time_window: "year".to_string(),
			page_limit: 100,
			max_pages: 1,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Filter {
	pub min_score: i64,
	pub min_comments: u64,
	pub min_body_chars: usize,
	pub strong_engagement_comments: u64,
	pub min_upvote_ratio: f64,
}
impl Default for Filter {
	fn default() -> Self {
		Self {
			min_score: 1,
			min_comments: 2,
			min_body_chars: 100,
			strong_engagement_comments: 10,
			min_upvote_ratio: 0.6,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	/// Candidates must score strictly above this value to survive.
	pub min_relevance: f64,
	pub top_window: usize,
	pub enrich_count: usize,
	pub title_lead_bonus: f64,
	pub title_match_bonus: f64,
	pub body_hit_weight: f64,
	pub body_hit_cap: f64,
	pub category_bonus: f64,
	pub engagement_scale: f64,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			min_relevance: 2.0,
			top_window: 15,
			enrich_count: 10,
			title_lead_bonus: 10.0,
			title_match_bonus: 5.0,
			body_hit_weight: 2.0,
			body_hit_cap: 10.0,
			category_bonus: 3.0,
			engagement_scale: 0.5,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Enrichment {
	pub request_limit: u32,
	pub request_depth: u32,
	pub request_sort: String,
	pub max_comments: usize,
	pub min_comment_chars: usize,
	pub max_concurrency: usize,
	pub snippet_chars: usize,
}
impl Default for Enrichment {
	fn default() -> Self {
		Self {
			request_limit: 15,
			request_depth: 1,
			request_sort: "top".to_string(),
			max_comments: 8,
			min_comment_chars: 10,
			max_concurrency: 10,
			snippet_chars: 300,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Synthesis {
	pub content_chars: usize,
	pub comment_chars: usize,
	pub pain_points: u32,
	pub communities: u32,
	pub triggers: u32,
	pub market_trends: u32,
	pub consumer_insights: u32,
	pub industry_insights: u32,
	pub seasonal_topics: u32,
	/// Sampling for the market research report; the discussion report uses `[providers.llm]`.
	pub research_temperature: f32,
	pub research_max_tokens: u32,
}
impl Default for Synthesis {
	fn default() -> Self {
		Self {
			content_chars: 300,
			comment_chars: 800,
			pain_points: 6,
			communities: 3,
			triggers: 4,
			market_trends: 6,
			consumer_insights: 3,
			industry_insights: 3,
			seasonal_topics: 3,
			research_temperature: 0.7,
			research_max_tokens: 4_000,
		}
	}
}

fn default_model() -> String {
	DEFAULT_MODEL.to_string()
}

fn default_query_suffix() -> String {
	"trends marketing advertising content social media".to_string()
}

fn default_num_results() -> u32 {
	10
}
