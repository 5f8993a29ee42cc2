pub mod analyze;
pub mod coordinator;
pub mod enrich;
pub mod report;
pub mod research;
pub mod synthesis;

mod error;

pub use analyze::{AnalyzeRequest, AnalyzeResponse};
pub use coordinator::SingleFlight;
pub use error::{Error, Result, Stage};
pub use report::{InsightReport, MarketResearchReport};
pub use research::{MarketResearchRequest, MarketResearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use pulse_config::{
	Config, DEFAULT_MODEL, Enrichment, LlmProviderConfig, RedditProviderConfig,
	WebSearchProviderConfig,
};
use pulse_domain::{RawComment, SearchPage, SearchRequest, WebResult};
use pulse_providers::{
	comments, completion, completion::CompletionRequest, retry::Backoff, search, token,
	token::AccessToken, web_search,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Model lookup keys for the two analytics variants.
pub const ANALYZE_MODEL_KEY: &str = "reddit_analytics";
pub const RESEARCH_MODEL_KEY: &str = "market_research";

pub trait TokenProvider
where
	Self: Send + Sync,
{
	fn acquire_token<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		backoff: &'a Backoff,
	) -> BoxFuture<'a, pulse_providers::Result<AccessToken>>;
}

pub trait SourceProvider
where
	Self: Send + Sync,
{
	fn search_page<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		token: &'a str,
		query: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, pulse_providers::Result<SearchPage>>;
}

pub trait CommentProvider
where
	Self: Send + Sync,
{
	fn fetch_comments<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		enrichment: &'a Enrichment,
		token: &'a str,
		permalink: &'a str,
	) -> BoxFuture<'a, pulse_providers::Result<Vec<RawComment>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a CompletionRequest<'a>,
	) -> BoxFuture<'a, pulse_providers::Result<String>>;
}

pub trait WebSearchProvider
where
	Self: Send + Sync,
{
	fn search_web<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, pulse_providers::Result<Vec<WebResult>>>;
}

/// Opaque model lookup: api name to model identifier.
pub trait ModelLookup
where
	Self: Send + Sync,
{
	fn model_for(&self, cfg: &Config, api_name: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct Providers {
	pub token: Arc<dyn TokenProvider>,
	pub source: Arc<dyn SourceProvider>,
	pub comments: Arc<dyn CommentProvider>,
	pub completion: Arc<dyn CompletionProvider>,
	pub web_search: Arc<dyn WebSearchProvider>,
	pub models: Arc<dyn ModelLookup>,
}
impl Providers {
	pub fn new(
		token: Arc<dyn TokenProvider>,
		source: Arc<dyn SourceProvider>,
		comments: Arc<dyn CommentProvider>,
		completion: Arc<dyn CompletionProvider>,
		web_search: Arc<dyn WebSearchProvider>,
		models: Arc<dyn ModelLookup>,
	) -> Self {
		Self { token, source, comments, completion, web_search, models }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			token: provider.clone(),
			source: provider.clone(),
			comments: provider.clone(),
			completion: provider.clone(),
			web_search: provider.clone(),
			models: provider,
		}
	}
}

pub struct PulseService {
	pub cfg: Arc<Config>,
	pub providers: Providers,
	analyze_flights: SingleFlight<AnalyzeResponse>,
	research_flights: SingleFlight<MarketResearchResponse>,
}
impl PulseService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self {
			cfg: Arc::new(cfg),
			providers,
			analyze_flights: SingleFlight::new(),
			research_flights: SingleFlight::new(),
		}
	}

	/// Pending `analyze` runs, keyed by trimmed query text.
	pub fn analyze_flights(&self) -> &SingleFlight<AnalyzeResponse> {
		&self.analyze_flights
	}

	pub fn research_flights(&self) -> &SingleFlight<MarketResearchResponse> {
		&self.research_flights
	}
}

struct DefaultProviders;
impl TokenProvider for DefaultProviders {
	fn acquire_token<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		backoff: &'a Backoff,
	) -> BoxFuture<'a, pulse_providers::Result<AccessToken>> {
		Box::pin(token::acquire_token(cfg, backoff))
	}
}
impl SourceProvider for DefaultProviders {
	fn search_page<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		token: &'a str,
		query: &'a str,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, pulse_providers::Result<SearchPage>> {
		Box::pin(search::search_page(cfg, token, query, request))
	}
}
impl CommentProvider for DefaultProviders {
	fn fetch_comments<'a>(
		&'a self,
		cfg: &'a RedditProviderConfig,
		enrichment: &'a Enrichment,
		token: &'a str,
		permalink: &'a str,
	) -> BoxFuture<'a, pulse_providers::Result<Vec<RawComment>>> {
		Box::pin(comments::fetch_comments(cfg, enrichment, token, permalink))
	}
}
impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a CompletionRequest<'a>,
	) -> BoxFuture<'a, pulse_providers::Result<String>> {
		Box::pin(completion::complete(cfg, request))
	}
}
impl WebSearchProvider for DefaultProviders {
	fn search_web<'a>(
		&'a self,
		cfg: &'a WebSearchProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, pulse_providers::Result<Vec<WebResult>>> {
		Box::pin(web_search::search_web(cfg, query))
	}
}
impl ModelLookup for DefaultProviders {
	fn model_for(&self, cfg: &Config, api_name: &str) -> Option<String> {
		cfg.models.get(api_name).cloned()
	}
}

/// Short stable identifier for a query, safe to log.
pub fn query_fingerprint(query: &str) -> String {
	let hash = blake3::hash(query.as_bytes()).to_hex();

	hash.as_str()[..12].to_string()
}

pub(crate) fn resolve_model(cfg: &Config, lookup: &dyn ModelLookup, api_name: &str) -> String {
	if let Some(model) = lookup.model_for(cfg, api_name) {
		let model = model.trim();

		if !model.is_empty() {
			return model.to_string();
		}
	}

	let fallback = cfg.providers.llm.default_model.trim();

	if fallback.is_empty() { DEFAULT_MODEL.to_string() } else { fallback.to_string() }
}

pub(crate) fn require_credential(label: &str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::Config { message: format!("{label} must be set.") });
	}

	Ok(())
}
